//! Error types for artifact store backends.

use thiserror::Error;

/// Errors produced by store factories and backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The factory does not handle the given locator scheme. The
    /// registry moves on to the next factory; any other error is fatal.
    #[error("initialization not possible from given locator")]
    NotApplicable,

    /// The locator could not be parsed or is missing required parts.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    /// No deployment exists for the given identifier.
    #[error("no deployment was found for the given identifier")]
    NoDeploymentFound,

    /// The given deployment id was not found for the identifier.
    #[error("the given deployment id was not found for the identifier")]
    NoSuchDeployment,

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Object storage request failed.
    #[error("object storage error: {0}")]
    ObjectStorage(String),
}
