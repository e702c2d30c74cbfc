//! Object storage for staging reference images
//!
//! Uploads input images to an S3-compatible bucket (Volcengine TOS) under
//! content-addressed keys and issues time-limited signed GET URLs the
//! generation backend can fetch.

pub mod client;
pub mod mime;
pub mod mock;

pub use client::TosStorageClient;
pub use mock::MockObjectStorage;

use crate::models::StagedImage;
use crate::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;
    async fn presign_get(&self, key: &str) -> Result<String>;
}

/// Storage key for an image: `imgs/<sha256 hex>.<ext>`. Identical bytes always
/// map to the same key, so re-uploads overwrite the same object.
pub fn object_key_for(data: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(data));
    let ext = mime::extension_for_mime(mime::detect_image_mime(data));
    format!("imgs/{}.{}", digest, ext)
}

/// Upload one image and return its signed URL.
pub async fn stage_image(storage: &dyn ObjectStorage, data: &[u8]) -> Result<StagedImage> {
    let key = object_key_for(data);
    let content_type = mime::detect_image_mime(data);

    tracing::info!("Uploading image to TOS with key: {}", key);
    storage.put_object(&key, data, content_type).await?;

    tracing::info!("Generating pre-signed URL for key: {}", key);
    let url = storage.presign_get(&key).await?;

    Ok(StagedImage { key, url })
}
