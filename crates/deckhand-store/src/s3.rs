//! S3 object storage artifact store (`s3://bucket/prefix` locators).
//!
//! Credentials come from the ambient environment (instance profile,
//! environment variables, shared config), the same way the rest of the
//! AWS SDK resolves them.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use url::Url;

use crate::error::StoreError;
use crate::store::{artifact_name, ArtifactStore, StoreFactory, StoreResult, ARTIFACT_SUFFIX};

/// Factory for [`S3Store`], accepting `s3://` locators.
pub struct S3StoreFactory;

#[async_trait]
impl StoreFactory for S3StoreFactory {
    async fn open(&self, locator: &str) -> StoreResult<Box<dyn ArtifactStore>> {
        let url =
            Url::parse(locator).map_err(|err| StoreError::InvalidLocator(err.to_string()))?;
        if url.scheme() != "s3" {
            return Err(StoreError::NotApplicable);
        }

        let bucket = url
            .host_str()
            .ok_or_else(|| StoreError::InvalidLocator("s3 locator has no bucket".to_string()))?
            .to_string();
        let prefix = url.path().trim_matches('/').to_string();

        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let client = Client::new(&config);

        Ok(Box::new(S3Store {
            client,
            bucket,
            prefix,
        }))
    }
}

/// Store backed by an S3 bucket, optionally under a key prefix.
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    fn object_key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.prefix)
        }
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn latest_deployment(&self, identifier: &str) -> StoreResult<String> {
        let object_prefix = self.object_key(identifier);

        // Keep only the most recent candidate while paging.
        let mut newest: Option<((i64, u32), String)> = None;

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&object_prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| StoreError::ObjectStorage(err.to_string()))?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                if !key.ends_with(ARTIFACT_SUFFIX) {
                    continue;
                }
                let Some(modified) = object.last_modified() else {
                    continue;
                };

                let stamp = (modified.secs(), modified.subsec_nanos());
                if newest.as_ref().is_none_or(|(current, _)| stamp > *current) {
                    newest = Some((stamp, key.to_string()));
                }
            }
        }

        let (_, key) = newest.ok_or(StoreError::NoDeploymentFound)?;

        let name = key.rsplit('/').next().unwrap_or(key.as_str());
        let stem = name.strip_suffix(ARTIFACT_SUFFIX).unwrap_or(name);
        let id = stem.strip_prefix(identifier).unwrap_or(stem);
        Ok(id.to_string())
    }

    async fn fetch_artifact(
        &self,
        identifier: &str,
        deployment_id: &str,
    ) -> StoreResult<Vec<u8>> {
        let key = self.object_key(&artifact_name(identifier, deployment_id));

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    return Err(StoreError::NoSuchDeployment);
                }
                return Err(StoreError::ObjectStorage(err.to_string()));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::ObjectStorage(err.to_string()))?
            .into_bytes();

        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!(
            "s3 store at bucket {:?} with prefix {:?}",
            self.bucket, self.prefix
        )
    }
}
