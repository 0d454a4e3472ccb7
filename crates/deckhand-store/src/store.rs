//! Artifact store abstraction and backend selection.

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Filename suffix of deployment artifacts.
pub const ARTIFACT_SUFFIX: &str = ".zip";

/// Artifact naming convention: `identifier + deployment_id + ".zip"`.
pub fn artifact_name(identifier: &str, deployment_id: &str) -> String {
    format!("{identifier}{deployment_id}{ARTIFACT_SUFFIX}")
}

/// A source of deployment ids and bundle bytes for a software identifier.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Latest deployment id for the identifier, ranked by last-modified
    /// time. `StoreError::NoDeploymentFound` when the identifier has no
    /// deployments.
    async fn latest_deployment(&self, identifier: &str) -> StoreResult<String>;

    /// Raw bundle bytes for identifier + deployment id.
    /// `StoreError::NoSuchDeployment` when the artifact does not exist.
    async fn fetch_artifact(&self, identifier: &str, deployment_id: &str)
        -> StoreResult<Vec<u8>>;

    /// Backend description for debug logging.
    fn describe(&self) -> String;
}

/// Builds a store from a locator, or declines it.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// Offer a locator to this factory. `StoreError::NotApplicable`
    /// when the scheme is not handled; any other error means the
    /// locator was accepted but initialization failed.
    async fn open(&self, locator: &str) -> StoreResult<Box<dyn ArtifactStore>>;
}

/// Ordered list of store factories, probed first-match-wins.
#[derive(Default)]
pub struct StoreRegistry {
    factories: Vec<Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in backends: local filesystem, then S3.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::local::LocalStoreFactory));
        registry.register(Box::new(crate::s3::S3StoreFactory));
        registry
    }

    /// Append a factory. Registration order is probe order.
    pub fn register(&mut self, factory: Box<dyn StoreFactory>) {
        self.factories.push(factory);
    }

    /// Offer the locator to each factory in order. The first factory
    /// that does not decline wins; a real error stops the probe and is
    /// fatal to startup. All factories declining yields
    /// `StoreError::NotApplicable` (a configuration error).
    pub async fn open(&self, locator: &str) -> StoreResult<Box<dyn ArtifactStore>> {
        for factory in &self.factories {
            match factory.open(locator).await {
                Err(StoreError::NotApplicable) => continue,
                Ok(store) => {
                    debug!(provider = %store.describe(), "Storage backend selected");
                    return Ok(store);
                }
                Err(err) => return Err(err),
            }
        }

        Err(StoreError::NotApplicable)
    }
}
