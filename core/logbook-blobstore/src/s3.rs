//! S3 object store.
//!
//! Keys are scoped by access level the same way the hosted storage
//! category lays them out: `public/<key>`, `protected/<identity>/<key>`,
//! `private/<identity>/<key>`.

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::ObjectStore;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Visibility scope of stored objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    Protected,
    #[default]
    Private,
}

/// S3 store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_level: AccessLevel,
    /// Identity the protected/private prefixes are scoped to.
    pub identity_id: Option<String>,
    /// Custom endpoint, e.g. a local S3-compatible server.
    pub endpoint_url: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            access_level: AccessLevel::Private,
            identity_id: None,
            endpoint_url: None,
        }
    }
}

impl S3Config {
    /// Checks the settings before any request is made.
    pub fn validate(&self) -> BlobStoreResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(BlobStoreError::Config("bucket is empty".to_string()));
        }
        if self.access_level != AccessLevel::Public && self.identity_id.is_none() {
            return Err(BlobStoreError::Config(format!(
                "{:?} access requires an identity id",
                self.access_level
            )));
        }
        Ok(())
    }

    /// Maps a storage key to the full object key in the bucket.
    pub fn object_key(&self, key: &str) -> String {
        match (self.access_level, &self.identity_id) {
            (AccessLevel::Public, _) => format!("public/{key}"),
            (AccessLevel::Protected, Some(identity)) => format!("protected/{identity}/{key}"),
            (AccessLevel::Private, Some(identity)) => format!("private/{identity}/{key}"),
            (level, None) => format!("{}/{key}", format!("{level:?}").to_lowercase()),
        }
    }
}

/// Object store backed by an S3 bucket.
pub struct S3ObjectStore {
    config: S3Config,
    client: Client,
}

impl S3ObjectStore {
    /// Creates a store using the default AWS credential chain.
    pub async fn connect(config: S3Config) -> BlobStoreResult<Self> {
        config.validate()?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            config,
        })
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn store_name(&self) -> &'static str {
        "S3"
    }

    async fn remove(&self, key: &str) -> BlobStoreResult<()> {
        let object_key = self.config.object_key(key);
        debug!("Removing s3://{}/{}", self.config.bucket, object_key);

        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| {
                BlobStoreError::S3(format!("remove {object_key}: {}", DisplayErrorContext(&e)))
            })?;

        info!("Removed object: {}", object_key);
        Ok(())
    }
}
