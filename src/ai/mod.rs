//! Image generation backend integration
//!
//! Provides the interface to the Ark (Doubao Seedream) image generation API
//! along with an in-memory mock for tests and harnesses.

pub mod ark;
pub mod mock;

pub use ark::ArkImageClient;
pub use mock::MockImageGenerationClient;

use crate::Result;
use ark::{GenerateImagesRequest, GenerateImagesResponse};
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Run one generation call. A 2xx response is returned as-is, including
    /// any inline `error` payload.
    async fn generate_images(
        &self,
        request: &GenerateImagesRequest,
    ) -> Result<GenerateImagesResponse>;
}
