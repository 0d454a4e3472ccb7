//! In-memory deployment bundle container.
//!
//! A bundle is a ZIP archive fetched from the artifact store. It is
//! parsed fully into memory once, giving the rest of the engine
//! random access to entries by path. Bundles are never mutated.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::BundleError;

/// A single entry of a deployment bundle.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// Entry path as recorded in the archive (POSIX separators).
    pub path: String,

    /// Raw entry bytes (empty for directories).
    pub data: Vec<u8>,

    /// Unix permission bits recorded for the entry.
    pub mode: u32,

    /// Whether the entry represents a directory.
    pub is_dir: bool,
}

impl BundleEntry {
    /// Build a regular file entry.
    pub fn file(path: &str, data: &[u8], mode: u32) -> Self {
        Self {
            path: path.to_string(),
            data: data.to_vec(),
            mode,
            is_dir: false,
        }
    }

    /// Build a directory entry.
    pub fn dir(path: &str) -> Self {
        Self {
            path: path.to_string(),
            data: Vec::new(),
            mode: 0o755,
            is_dir: true,
        }
    }
}

/// Default permission bits for archives that record none.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// An immutable, randomly addressable deployment bundle.
#[derive(Debug)]
pub struct Bundle {
    entries: Vec<BundleEntry>,
}

impl Bundle {
    /// Parse a ZIP archive into a bundle.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, BundleError> {
        let mut archive = ZipArchive::new(Cursor::new(raw))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            entries.push(BundleEntry {
                path: file.name().to_string(),
                mode: file
                    .unix_mode()
                    .map(|mode| mode & 0o7777)
                    .unwrap_or(DEFAULT_FILE_MODE),
                is_dir: file.is_dir(),
                data,
            });
        }

        Ok(Self { entries })
    }

    /// Build a bundle directly from entries. Used by fixtures and tests.
    pub fn from_entries(entries: Vec<BundleEntry>) -> Self {
        Self { entries }
    }

    /// Look up an entry by exact, case-sensitive path.
    pub fn entry(&self, path: &str) -> Option<&BundleEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    /// All entries in archive order.
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8], Option<u32>)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, data, mode) in entries {
            let mut options = SimpleFileOptions::default();
            if let Some(mode) = mode {
                options = options.unix_permissions(*mode);
            }
            if path.ends_with('/') {
                writer.add_directory(path.to_string(), options).unwrap();
            } else {
                writer.start_file(path.to_string(), options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_from_bytes_indexes_entries() {
        let raw = build_zip(&[
            ("appspec.yml", b"version: 0.0", None),
            ("app/", b"", None),
            ("app/server", b"#!/bin/sh\n", Some(0o755)),
        ]);

        let bundle = Bundle::from_bytes(raw).unwrap();
        assert_eq!(bundle.entries().len(), 3);

        let server = bundle.entry("app/server").unwrap();
        assert_eq!(server.mode, 0o755);
        assert!(!server.is_dir);
        assert_eq!(server.data, b"#!/bin/sh\n");

        assert!(bundle.entry("app/").unwrap().is_dir);
    }

    #[test]
    fn test_entry_lookup_is_case_sensitive() {
        let raw = build_zip(&[("AppSpec.yml", b"x", None)]);
        let bundle = Bundle::from_bytes(raw).unwrap();
        assert!(bundle.entry("appspec.yml").is_none());
        assert!(bundle.entry("AppSpec.yml").is_some());
    }

    #[test]
    fn test_mode_defaults_when_unrecorded() {
        let bundle = Bundle::from_entries(vec![BundleEntry::file("a.txt", b"a", 0o644)]);
        assert_eq!(bundle.entry("a.txt").unwrap().mode, 0o644);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Bundle::from_bytes(b"not a zip archive".to_vec()).is_err());
    }
}
