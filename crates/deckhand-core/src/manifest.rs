//! Appspec manifest model and validation.
//!
//! The manifest is a YAML document named `appspec.yml` at the bundle
//! root. It declares file placement directives and lifecycle hooks.
//! The `os` and `permissions` fields of the format are accepted and
//! ignored.

use std::collections::HashMap;

use serde::Deserialize;

use crate::bundle::Bundle;
use crate::error::ManifestError;

/// Fixed, case-sensitive in-bundle path of the manifest document.
pub const MANIFEST_PATH: &str = "appspec.yml";

/// The only supported manifest format version.
pub const SUPPORTED_VERSION: f64 = 0.0;

/// Fallback hook timeout in seconds when none is configured.
pub const DEFAULT_HOOK_TIMEOUT_SECS: u64 = 3600;

/// A source-to-destination file placement rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDirective {
    /// Bundle path, path prefix, or the root marker `/`.
    pub source: String,

    /// Host directory the matched entries are placed under.
    pub destination: String,
}

/// One shell script bound to a lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HookSpec {
    /// Script path inside the bundle.
    pub location: String,

    /// Timeout in seconds; 0 means unset.
    #[serde(default)]
    pub timeout: u64,

    /// Optional user name the script runs as.
    #[serde(default)]
    pub runas: Option<String>,
}

impl HookSpec {
    /// Configured timeout, or the 3600s default when zero/unset.
    pub fn effective_timeout(&self) -> u64 {
        if self.timeout == 0 {
            DEFAULT_HOOK_TIMEOUT_SECS
        } else {
            self.timeout
        }
    }
}

/// Parsed appspec manifest. Immutable after parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Manifest format version.
    #[serde(default)]
    pub version: f64,

    /// Ordered file placement directives.
    #[serde(default)]
    pub files: Vec<FileDirective>,

    /// Hooks keyed by phase name. Unknown phase names are preserved
    /// here but never executed.
    #[serde(default)]
    pub hooks: HashMap<String, Vec<HookSpec>>,
}

impl Manifest {
    /// Locate and decode the manifest document inside a bundle.
    pub fn parse(bundle: &Bundle) -> Result<Self, ManifestError> {
        let entry = bundle.entry(MANIFEST_PATH).ok_or(ManifestError::Missing)?;
        Ok(serde_yaml::from_slice(&entry.data)?)
    }

    /// Check the manifest format version.
    ///
    /// An absent `version` field deserializes to 0 and passes. Manifests
    /// in the wild rely on that, so it stays.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.version != SUPPORTED_VERSION {
            return Err(ManifestError::UnsupportedVersion(self.version));
        }

        Ok(())
    }
}
