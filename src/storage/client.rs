use super::ObjectStorage;
use crate::models::StorageConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client as S3Client};
use std::time::Duration;

/// Volcengine TOS accessed through its S3-compatible endpoint. The endpoint in
/// [`StorageConfig`] is already in `tos-s3-` form.
pub struct TosStorageClient {
    client: S3Client,
    bucket: String,
    presign_expires: Duration,
}

impl TosStorageClient {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "volcengine-tos",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .load()
            .await;

        Ok(Self {
            client: S3Client::new(&sdk_config),
            bucket: config.bucket.clone(),
            presign_expires: config.presign_expires,
        })
    }
}

#[async_trait]
impl ObjectStorage for TosStorageClient {
    async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload image to TOS: {}", e);
                Error::Upload(format!("failed to upload image to TOS: {}", e))
            })?;

        Ok(())
    }

    async fn presign_get(&self, key: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.presign_expires)
            .map_err(|e| Error::Upload(format!("invalid pre-signed URL expiry: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!("Failed to generate pre-signed URL: {}", e);
                Error::Upload(format!("failed to generate pre-signed URL: {}", e))
            })?;

        Ok(request.uri().to_string())
    }
}
