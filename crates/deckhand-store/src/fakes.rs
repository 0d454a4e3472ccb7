//! In-memory fake for the store traits (testing only).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::{ArtifactStore, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    /// (identifier, deployment id, bundle bytes); push order is recency.
    artifacts: Vec<(String, String, Vec<u8>)>,
}

/// In-memory artifact store. The most recently pushed artifact for an
/// identifier is its latest deployment.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact, making it the identifier's latest deployment.
    pub fn push(&self, identifier: &str, deployment_id: &str, bytes: Vec<u8>) {
        self.inner.lock().unwrap().artifacts.push((
            identifier.to_string(),
            deployment_id.to_string(),
            bytes,
        ));
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn latest_deployment(&self, identifier: &str) -> StoreResult<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .artifacts
            .iter()
            .rev()
            .find(|(id, _, _)| id == identifier)
            .map(|(_, deployment, _)| deployment.clone())
            .ok_or(StoreError::NoDeploymentFound)
    }

    async fn fetch_artifact(
        &self,
        identifier: &str,
        deployment_id: &str,
    ) -> StoreResult<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .artifacts
            .iter()
            .rev()
            .find(|(id, deployment, _)| id == identifier && deployment == deployment_id)
            .map(|(_, _, bytes)| bytes.clone())
            .ok_or(StoreError::NoSuchDeployment)
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latest_is_most_recent_push() {
        let store = MemoryStore::new();
        store.push("app", "v1", vec![1]);
        store.push("app", "v2", vec![2]);
        store.push("other", "v9", vec![9]);

        assert_eq!(store.latest_deployment("app").await.unwrap(), "v2");
        assert_eq!(store.fetch_artifact("app", "v1").await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.latest_deployment("ghost").await,
            Err(StoreError::NoDeploymentFound)
        ));
        assert!(matches!(
            store.fetch_artifact("ghost", "v1").await,
            Err(StoreError::NoSuchDeployment)
        ));
    }
}
