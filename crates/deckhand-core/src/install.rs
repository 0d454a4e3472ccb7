//! File placement: maps manifest file directives onto bundle entries.
//!
//! The matching rules reproduce the appspec file directive semantics:
//!
//! - If `source` equals an entry path exactly, only that file is
//!   copied, directly under the destination directory.
//! - If `source` is a single slash, every file in the bundle is copied.
//! - Otherwise every entry whose path starts with `source` is copied
//!   with the prefix stripped.
//!
//! Windows path conventions are not supported.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bundle::{Bundle, BundleEntry};
use crate::error::InstallError;
use crate::manifest::FileDirective;

/// Apply a single file directive. The first failed copy aborts the
/// directive; completed copies are not undone.
pub fn install_directive(bundle: &Bundle, directive: &FileDirective) -> Result<(), InstallError> {
    // Exact match: a single-file copy that short-circuits prefix
    // handling even when other entries would also match. Archives
    // carry directory entries under the same names as prefixes, so
    // only file entries qualify here.
    if let Some(entry) = bundle
        .entry(&directive.source)
        .filter(|entry| !entry.is_dir)
    {
        let strip = parent_prefix(&entry.path);
        return copy_entry(entry, &directive.destination, &strip);
    }

    // A bare "/" matches the entire revision.
    let prefix = if directive.source == "/" {
        ""
    } else {
        directive.source.as_str()
    };

    for entry in bundle.entries() {
        if entry.is_dir || !entry.path.starts_with(prefix) {
            continue;
        }
        copy_entry(entry, &directive.destination, prefix)?;
    }

    Ok(())
}

/// Directory portion of an entry path, used as the strip prefix for
/// exact-match copies so the file lands under the destination by name.
fn parent_prefix(path: &str) -> String {
    match path.rfind('/') {
        Some(index) => path[..index].to_string(),
        None => String::new(),
    }
}

fn copy_entry(
    entry: &BundleEntry,
    destination: &str,
    strip_prefix: &str,
) -> Result<(), InstallError> {
    let relative = entry
        .path
        .strip_prefix(strip_prefix)
        .unwrap_or(&entry.path)
        .trim_start_matches('/');
    let target: PathBuf = Path::new(destination).join(relative);

    if let Some(parent) = target.parent() {
        create_dirs(parent).map_err(|source| InstallError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(entry.mode);
    }

    let mut file = options
        .open(&target)
        .map_err(|source| InstallError::OpenDestination {
            path: target.display().to_string(),
            source,
        })?;

    file.write_all(&entry.data)
        .map_err(|source| InstallError::Write {
            entry: entry.path.clone(),
            path: target.display().to_string(),
            source,
        })
}

/// Create the destination directory tree with mode 0755.
fn create_dirs(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}
