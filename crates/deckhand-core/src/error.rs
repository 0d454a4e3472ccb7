//! Error taxonomy for the bundle execution engine.

use thiserror::Error;

/// Errors reading a deployment bundle archive.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The archive could not be parsed.
    #[error("bundle archive could not be read: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An entry's bytes could not be read.
    #[error("io error reading bundle entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors locating, decoding, or validating the appspec manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No appspec.yml entry in the bundle.
    #[error("appspec.yml not found in bundle")]
    Missing,

    /// The manifest document could not be decoded.
    #[error("appspec.yml could not be decoded: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// The manifest declares a version other than 0.
    #[error("unsupported appspec version: {0}")]
    UnsupportedVersion(f64),
}

/// Errors applying a file directive to the host filesystem.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The destination directory tree could not be created.
    #[error("unable to create destination directory {path:?}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    /// The destination file could not be opened for writing.
    #[error("unable to open destination {path:?} for writing: {source}")]
    OpenDestination {
        path: String,
        source: std::io::Error,
    },

    /// Writing the entry bytes to the destination failed.
    #[error("unable to write {entry:?} to {path:?}: {source}")]
    Write {
        entry: String,
        path: String,
        source: std::io::Error,
    },
}

/// Errors running a single lifecycle hook script.
#[derive(Debug, Error)]
pub enum HookError {
    /// The script path does not match any bundle entry.
    #[error("script {0:?} not found in bundle")]
    ScriptNotFound(String),

    /// The runas user name could not be resolved to a uid/gid.
    #[error("unable to resolve runas user {user:?}: {reason}")]
    RunAsResolution { user: String, reason: String },

    /// The shell interpreter could not be spawned or waited on.
    #[error("unable to run script {script:?}: {source}")]
    Spawn {
        script: String,
        source: std::io::Error,
    },

    /// The script exceeded its effective timeout and was killed.
    #[error("script {script:?} timed out after {seconds}s")]
    Timeout { script: String, seconds: u64 },

    /// The script exited with a non-zero status.
    #[error("script {script:?} failed: {detail}")]
    Failed { script: String, detail: String },
}

/// Terminal failure of a deployment lifecycle run, wrapped with the
/// phase or operation in which it occurred.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Manifest validation failed before any side effect.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A hook in the named phase failed; later phases were not run.
    #[error("hook {phase:?} failed: {source}")]
    Hook {
        phase: &'static str,
        source: HookError,
    },

    /// A file directive failed; later directives and phases were not run.
    #[error("file operation failed: {0}")]
    File(#[from] InstallError),
}
