//! Deckhand artifact store backends.
//!
//! A store backend answers two questions for a software identifier:
//! what is the latest deployment id, and what are the bundle bytes for
//! a given id. Backends are selected by offering the configured
//! locator URI to each registered factory in order.

pub mod error;
pub mod fakes;
pub mod local;
pub mod s3;
pub mod store;

pub use error::StoreError;
pub use fakes::MemoryStore;
pub use local::{LocalStore, LocalStoreFactory};
pub use s3::{S3Store, S3StoreFactory};
pub use store::{
    artifact_name, ArtifactStore, StoreFactory, StoreRegistry, StoreResult, ARTIFACT_SUFFIX,
};
