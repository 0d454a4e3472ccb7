//! Error types for notification backends.

use thiserror::Error;

/// Errors produced by notifier factories and deliveries.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The factory does not handle the given locator scheme.
    #[error("initialization not possible from given locator")]
    NotApplicable,

    /// The locator could not be parsed.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    /// Filesystem error while writing a report.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote delivery failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}
