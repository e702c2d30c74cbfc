//! Request orchestration for a single `GenerateImage` call.
//!
//! Steps run strictly in order: stage input images, call the generation
//! backend, download each result. Everything up to and including the backend
//! call fails fast. Downloads are best effort: an entry without a URL, a
//! non-2xx status or a read failure drops that one image and the rest are
//! still returned, in backend order, with no placeholders.

use crate::ai::ark::{
    GenerateImagesRequest, ImageData, SequentialImageGenerationOptions, RESPONSE_FORMAT_URL,
};
use crate::ai::{ArkImageClient, ImageGenerationService};
use crate::download::{HttpImageDownloader, ImageDownloader};
use crate::models::{Config, GenerationRequest, GenerationResult};
use crate::storage::{self, ObjectStorage, TosStorageClient};
use crate::{Error, Result};
use tracing::{error, info, warn};
use uuid::Uuid;

const MISSING_API_KEY: &str = "ARK_API_KEY environment variable not set";
const MISSING_STORAGE: &str = "TOS environment variables not fully configured";

/// Handles `GenerateImage` requests against the configured collaborators.
pub struct App {
    image_gen: Option<Box<dyn ImageGenerationService>>,
    storage: Option<Box<dyn ObjectStorage>>,
    downloader: Box<dyn ImageDownloader>,
    model: String,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
///
/// A `None` collaborator behaves like missing configuration: calls that need
/// it fail with [`Error::Configuration`].
pub struct AppServices {
    pub image_gen: Option<Box<dyn ImageGenerationService>>,
    pub storage: Option<Box<dyn ObjectStorage>>,
    pub downloader: Box<dyn ImageDownloader>,
}

impl App {
    pub fn with_services(services: AppServices, model: String) -> Self {
        Self {
            image_gen: services.image_gen,
            storage: services.storage,
            downloader: services.downloader,
            model,
        }
    }

    /// Build production clients from configuration. Missing credentials are
    /// not fatal here; they surface per call.
    pub async fn new(config: &Config) -> Result<Self> {
        let image_gen: Option<Box<dyn ImageGenerationService>> = match config.require_api_key() {
            Ok(api_key) => {
                let client = reqwest::Client::builder()
                    .timeout(config.ark_timeout)
                    .build()?;
                info!(
                    "Image provider: Ark (model: {}, endpoint: {})",
                    config.model, config.ark_base_url
                );
                Some(Box::new(ArkImageClient::new_with_client(
                    api_key.to_string(),
                    config.ark_base_url.clone(),
                    client,
                )) as Box<dyn ImageGenerationService>)
            }
            Err(e) => {
                warn!("{}; every request will be rejected", e);
                None
            }
        };

        let storage: Option<Box<dyn ObjectStorage>> = match config.storage_config() {
            Ok(storage_config) => {
                info!(
                    "Image staging: TOS bucket {} at {}",
                    storage_config.bucket, storage_config.endpoint
                );
                let client = TosStorageClient::new(&storage_config).await?;
                Some(Box::new(client) as Box<dyn ObjectStorage>)
            }
            Err(e) => {
                warn!("{}; requests with input images will be rejected", e);
                None
            }
        };

        let download_client = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .build()?;

        Ok(Self::with_services(
            AppServices {
                image_gen,
                storage,
                downloader: Box::new(HttpImageDownloader::new_with_client(download_client)),
            },
            config.model.clone(),
        ))
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let request_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        info!(
            "[{}] Received image generation request with prompt: {}",
            request_id, request.prompt
        );

        let image_gen = self
            .image_gen
            .as_deref()
            .ok_or_else(|| Error::Configuration(MISSING_API_KEY.to_string()))?;

        let image_urls = if request.images.is_empty() {
            Vec::new()
        } else {
            self.stage_images(&request_id, &request.images).await?
        };

        let api_request = self.build_request(request, image_urls);

        let response = image_gen
            .generate_images(&api_request)
            .await
            .map_err(|e| {
                error!("[{}] Error calling GenerateImages API: {}", request_id, e);
                e
            })?;

        if let Some(api_error) = &response.error {
            error!("[{}] API returned an error: {}", request_id, api_error);
            return Err(Error::Backend(api_error.to_string()));
        }

        info!(
            "[{}] Successfully generated {} images ({} data entries)",
            request_id,
            response.generated_images(),
            response.data.len()
        );

        let images = self.download_images(&request_id, &response.data).await;
        info!(
            "[{}] Returning {} of {} images",
            request_id,
            images.len(),
            response.data.len()
        );

        Ok(GenerationResult { images })
    }

    async fn stage_images(&self, request_id: &str, images: &[Vec<u8>]) -> Result<Vec<String>> {
        let storage = self
            .storage
            .as_deref()
            .ok_or_else(|| Error::Configuration(MISSING_STORAGE.to_string()))?;

        let mut urls = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let staged = storage::stage_image(storage, image).await.map_err(|e| {
                error!("[{}] Failed to stage input image {}: {}", request_id, i + 1, e);
                e
            })?;
            info!(
                "[{}] Staged input image {} as {}",
                request_id,
                i + 1,
                staged.key
            );
            urls.push(staged.url);
        }

        Ok(urls)
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
        image_urls: Vec<String>,
    ) -> GenerateImagesRequest {
        GenerateImagesRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            image: image_urls,
            size: Some(request.size.clone()).filter(|size| !size.is_empty()),
            response_format: RESPONSE_FORMAT_URL.to_string(),
            watermark: request.watermark,
            sequential_image_generation: request.sequential_mode().to_string(),
            sequential_image_generation_options: (request.max_images > 0).then(|| {
                SequentialImageGenerationOptions {
                    max_images: request.max_images,
                }
            }),
        }
    }

    async fn download_images(&self, request_id: &str, data: &[ImageData]) -> Vec<Vec<u8>> {
        let mut images = Vec::with_capacity(data.len());

        for (i, item) in data.iter().enumerate() {
            let Some(url) = item.url.as_deref() else {
                warn!("[{}] Image {} has no URL, skipping", request_id, i + 1);
                continue;
            };

            info!("[{}] Downloading image {} from URL: {}", request_id, i + 1, url);
            match self.downloader.download(url).await {
                Ok(bytes) => {
                    info!(
                        "[{}] Finished downloading image {} ({} bytes)",
                        request_id,
                        i + 1,
                        bytes.len()
                    );
                    images.push(bytes);
                }
                Err(e) => {
                    warn!("[{}] Skipping image {}: {}", request_id, i + 1, e);
                }
            }
        }

        images
    }
}
