//! S3 client implementation.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Configuration for the S3 publish client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Access key id; `None` uses the ambient credential chain
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
    /// AWS region
    pub region: String,
    /// Bucket name
    pub bucket_name: String,
    /// CDN domain fronting the bucket
    pub cdn_domain: String,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket_name: std::env::var("S3_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("S3_BUCKET_NAME not set"))?,
            cdn_domain: std::env::var("CDN_DOMAIN")
                .map_err(|_| StorageError::config_error("CDN_DOMAIN not set"))?,
        })
    }
}

/// S3 publish client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    cdn_domain: String,
}

impl S3Client {
    /// Create a new client from configuration.
    ///
    /// Explicit credentials win; otherwise the SDK's default chain (IAM
    /// role, environment, profile) applies.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(key), Some(secret)) = (
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
        ) {
            loader = loader.credentials_provider(Credentials::new(key, secret, None, None, "env"));
        }

        let sdk_config = loader.load().await;
        let client = Client::new(&sdk_config);

        Ok(Self {
            client,
            bucket: config.bucket_name,
            cdn_domain: config.cdn_domain,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// CDN domain fronting the bucket.
    pub fn cdn_domain(&self) -> &str {
        &self.cdn_domain
    }

    /// Whether an object exists at `key`.
    pub async fn object_exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::head_failed(service_err.to_string()))
                }
            }
        }
    }

    /// Delete the object at `key`.
    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;
        debug!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Upload a file to `key` with the given content type.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("Uploading {} to s3://{}/{}", path.display(), self.bucket, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        Ok(())
    }
}
