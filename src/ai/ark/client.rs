use super::types::{ArkErrorEnvelope, GenerateImagesRequest, GenerateImagesResponse};
use crate::ai::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

const GENERATIONS_PATH: &str = "/images/generations";

/// Ark (Volcengine) image generation over its OpenAI-style REST API.
pub struct ArkImageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ArkImageClient {
    pub fn new_with_client(api_key: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageGenerationService for ArkImageClient {
    async fn generate_images(
        &self,
        request: &GenerateImagesRequest,
    ) -> Result<GenerateImagesResponse> {
        let url = format!("{}{}", self.base_url, GENERATIONS_PATH);
        tracing::debug!("Sending image generation request to Ark (model: {})", request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Ark: {}", e);
                Error::Backend(format!("failed to call GenerateImages API: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::Backend(format!("failed to read GenerateImages response: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("Ark API error (status {}): {}", status, body);
            return Err(match serde_json::from_str::<ArkErrorEnvelope>(&body) {
                Ok(envelope) => Error::Backend(format!("{} (status {})", envelope.error, status)),
                Err(_) => Error::Backend(format!("status {}: {}", status, body)),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Ark response: {}\nBody: {}", e, body);
            Error::Backend(format!("failed to parse GenerateImages response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ark::types::{SequentialImageGenerationOptions, RESPONSE_FORMAT_URL};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> GenerateImagesRequest {
        GenerateImagesRequest {
            model: "doubao-seedream-4-0-250828".to_string(),
            prompt: "a red bicycle".to_string(),
            image: vec!["https://bucket.example.com/imgs/abc.png?sig=1".to_string()],
            size: Some("1024x1024".to_string()),
            response_format: RESPONSE_FORMAT_URL.to_string(),
            watermark: false,
            sequential_image_generation: "auto".to_string(),
            sequential_image_generation_options: Some(SequentialImageGenerationOptions {
                max_images: 2,
            }),
        }
    }

    fn client_for(server: &MockServer) -> ArkImageClient {
        ArkImageClient::new_with_client(
            "test-key".to_string(),
            format!("{}/api/v3", server.uri()),
            Client::new(),
        )
    }

    #[tokio::test]
    async fn test_generate_images_sends_request_and_parses_urls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/images/generations"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "doubao-seedream-4-0-250828",
                "prompt": "a red bicycle",
                "image": ["https://bucket.example.com/imgs/abc.png?sig=1"],
                "response_format": "url",
                "sequential_image_generation": "auto",
                "sequential_image_generation_options": { "max_images": 2 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "doubao-seedream-4-0-250828",
                "created": 1757321139,
                "data": [{ "url": "https://out.example.com/1.jpeg", "size": "1024x1024" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .generate_images(&sample_request())
            .await
            .unwrap();

        assert_eq!(response.data.len(), 1);
        assert_eq!(
            response.data[0].url.as_deref(),
            Some("https://out.example.com/1.jpeg")
        );
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_generate_images_error_status_carries_code_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/images/generations"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": "InvalidParameter",
                    "message": "The parameter `size` specified in the request is not valid",
                    "type": "BadRequest"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_images(&sample_request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Backend(_)));
        let message = err.to_string();
        assert!(message.contains("InvalidParameter"));
        assert!(message.contains("size"));
    }

    #[tokio::test]
    async fn test_generate_images_unstructured_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/images/generations"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_images(&sample_request())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Backend(_)));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_generate_images_transport_failure() {
        // Nothing listens on port 1.
        let client = ArkImageClient::new_with_client(
            "test-key".to_string(),
            "http://127.0.0.1:1/api/v3".to_string(),
            Client::new(),
        );

        let err = client.generate_images(&sample_request()).await.unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
        assert!(err.to_string().contains("failed to call GenerateImages API"));
    }
}
