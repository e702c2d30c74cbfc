//! Ark image-generation request/response payloads.

use serde::{Deserialize, Serialize};

pub const RESPONSE_FORMAT_URL: &str = "url";

/// Request body for `POST /images/generations`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateImagesRequest {
    pub model: String,
    pub prompt: String,
    /// Reference image URLs. Omitted for text-only generation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub response_format: String,
    pub watermark: bool,
    pub sequential_image_generation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_image_generation_options: Option<SequentialImageGenerationOptions>,
}

/// Options for sequential (group) generation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SequentialImageGenerationOptions {
    pub max_images: i32,
}

/// Top-level image generation response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub error: Option<ArkError>,
}

/// One generated image item.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ImageData {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub generated_images: usize,
}

impl GenerateImagesResponse {
    /// Images the backend reports as generated, falling back to the number of
    /// data entries when no usage block is present.
    pub fn generated_images(&self) -> usize {
        self.usage
            .as_ref()
            .map_or(self.data.len(), |usage| usage.generated_images)
    }
}

/// Structured error payload, either inline in a 200 body or as the body of a
/// non-2xx response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ArkError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ArkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}

/// Wrapper used by Ark for error bodies on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ArkErrorEnvelope {
    pub error: ArkError,
}
