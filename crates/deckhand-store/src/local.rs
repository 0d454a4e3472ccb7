//! Local filesystem artifact store (`file://` locators).

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use url::Url;

use crate::error::StoreError;
use crate::store::{artifact_name, ArtifactStore, StoreFactory, StoreResult, ARTIFACT_SUFFIX};

/// Factory for [`LocalStore`], accepting `file://` locators.
pub struct LocalStoreFactory;

#[async_trait]
impl StoreFactory for LocalStoreFactory {
    async fn open(&self, locator: &str) -> StoreResult<Box<dyn ArtifactStore>> {
        let url =
            Url::parse(locator).map_err(|err| StoreError::InvalidLocator(err.to_string()))?;
        if url.scheme() != "file" {
            return Err(StoreError::NotApplicable);
        }

        Ok(Box::new(LocalStore {
            root: PathBuf::from(url.path()),
        }))
    }
}

/// Store backed by a flat directory of `identifier + id + ".zip"` files.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Store rooted at a directory. Mainly for tests; the daemon goes
    /// through [`LocalStoreFactory`].
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn latest_deployment(&self, identifier: &str) -> StoreResult<String> {
        let mut candidates: Vec<(SystemTime, String)> = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(identifier) || !name.ends_with(ARTIFACT_SUFFIX) {
                continue;
            }

            candidates.push((meta.modified()?, name));
        }

        if candidates.is_empty() {
            return Err(StoreError::NoDeploymentFound);
        }

        candidates.sort_by(|a, b| a.0.cmp(&b.0));
        let (_, name) = candidates
            .pop()
            .ok_or(StoreError::NoDeploymentFound)?;

        let stem = name.strip_suffix(ARTIFACT_SUFFIX).unwrap_or(name.as_str());
        let id = stem.strip_prefix(identifier).unwrap_or(stem);
        Ok(id.to_string())
    }

    async fn fetch_artifact(
        &self,
        identifier: &str,
        deployment_id: &str,
    ) -> StoreResult<Vec<u8>> {
        let path = self.root.join(artifact_name(identifier, deployment_id));

        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NoSuchDeployment),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> String {
        format!("local file store at {:?}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_artifact(dir: &TempDir, name: &str, age: Duration) {
        let path = dir.path().join(name);
        fs::write(&path, b"zip-bytes").unwrap();
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_latest_picks_most_recent_mtime() {
        let dir = TempDir::new().unwrap();
        write_artifact(&dir, "myapp2024-01-01.zip", Duration::from_secs(300));
        write_artifact(&dir, "myapp2024-01-03.zip", Duration::from_secs(10));
        write_artifact(&dir, "myapp2024-01-02.zip", Duration::from_secs(100));

        let store = LocalStore::new(dir.path().to_path_buf());
        assert_eq!(store.latest_deployment("myapp").await.unwrap(), "2024-01-03");
    }

    #[tokio::test]
    async fn test_latest_ignores_other_identifiers_and_non_zip() {
        let dir = TempDir::new().unwrap();
        write_artifact(&dir, "otherapp-v9.zip", Duration::from_secs(1));
        write_artifact(&dir, "myapp-v1.tar", Duration::from_secs(1));
        write_artifact(&dir, "myapp-v1.zip", Duration::from_secs(60));
        fs::create_dir(dir.path().join("myapp-dir.zip")).unwrap();

        let store = LocalStore::new(dir.path().to_path_buf());
        assert_eq!(store.latest_deployment("myapp").await.unwrap(), "-v1");
    }

    #[tokio::test]
    async fn test_latest_with_no_candidates() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.latest_deployment("myapp").await,
            Err(StoreError::NoDeploymentFound)
        ));
    }

    #[tokio::test]
    async fn test_fetch_artifact_roundtrip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("myapp-v1.zip"), b"bundle-bytes").unwrap();

        let store = LocalStore::new(dir.path().to_path_buf());
        assert_eq!(
            store.fetch_artifact("myapp", "-v1").await.unwrap(),
            b"bundle-bytes"
        );
    }

    #[tokio::test]
    async fn test_fetch_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.fetch_artifact("myapp", "-v1").await,
            Err(StoreError::NoSuchDeployment)
        ));
    }

    #[tokio::test]
    async fn test_factory_scheme_handling() {
        let factory = LocalStoreFactory;
        assert!(matches!(
            factory.open("s3://bucket/prefix").await,
            Err(StoreError::NotApplicable)
        ));
        assert!(factory.open("file:///var/deployments").await.is_ok());
        assert!(matches!(
            factory.open("not a uri").await,
            Err(StoreError::InvalidLocator(_))
        ));
    }
}
