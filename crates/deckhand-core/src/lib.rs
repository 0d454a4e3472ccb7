//! Deckhand Core Library
//!
//! The bundle execution engine: appspec manifest model, file placement,
//! privileged hook execution, and the deployment lifecycle state machine.

pub mod bundle;
pub mod error;
pub mod hooks;
pub mod install;
pub mod lifecycle;
pub mod manifest;
pub mod runlog;

pub use bundle::{Bundle, BundleEntry};
pub use error::{BundleError, HookError, InstallError, LifecycleError, ManifestError};
pub use manifest::{FileDirective, HookSpec, Manifest};
pub use runlog::RunLog;
