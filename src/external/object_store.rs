//! Object store client: an S3-compatible bucket (MinIO in the reference
//! deployment) standing in for spec.md's "blob store" collaborator.
//!
//! `aws-sdk-s3` was picked over hand-rolling S3's REST signing because
//! it's the standard crate for this concern and layers cleanly on the
//! teacher's existing rustls-based HTTP stack; see DESIGN.md.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, key: &str) -> AppResult<Vec<u8>>;
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()>;
    /// Move `from` to `to` via copy-then-delete (S3 has no atomic rename).
    async fn copy_object(&self, from: &str, to: &str) -> AppResult<()>;
    async fn delete_object(&self, key: &str) -> AppResult<()>;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn from_settings(settings: &Settings) -> Self {
        let credentials = Credentials::new(
            &settings.object_store_access_key,
            &settings.object_store_secret_key,
            None,
            None,
            "lka-static",
        );
        let config = aws_sdk_s3::config::Builder::new()
            .region(Region::new(settings.object_store_region.clone()))
            .endpoint_url(&settings.object_store_endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(config),
            bucket: settings.object_store_bucket.clone(),
        }
    }

    /// Create the bucket if it doesn't already exist. Called once at
    /// startup, mirroring the original's `ensure_bucket_exists`.
    pub async fn ensure_bucket(&self) -> AppResult<()> {
        let exists = self.client.head_bucket().bucket(&self.bucket).send().await;
        if exists.is_ok() {
            return Ok(());
        }
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("create bucket failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, key: &str) -> AppResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("get_object({key}) failed: {e}")))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Upstream(format!("reading object body failed: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("put_object({key}) failed: {e}")))?;
        Ok(())
    }

    async fn copy_object(&self, from: &str, to: &str) -> AppResult<()> {
        let source = format!("{}/{}", self.bucket, from);
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(source)
            .key(to)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("copy_object({from} -> {to}) failed: {e}")))?;
        self.delete_object(from).await
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("delete_object({key}) failed: {e}")))?;
        Ok(())
    }
}
