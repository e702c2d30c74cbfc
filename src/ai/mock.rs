use super::ark::{ArkError, GenerateImagesRequest, GenerateImagesResponse, ImageData};
use super::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted generation backend. Records every request it receives.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<GenerateImagesResponse>>>,
    requests: Arc<Mutex<Vec<GenerateImagesRequest>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Respond with one data entry per item; `None` yields an entry without a URL.
    pub fn with_urls<I, S>(self, urls: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let data = urls
            .into_iter()
            .map(|url| ImageData {
                url: url.map(Into::into),
            })
            .collect();
        self.with_response(GenerateImagesResponse {
            data,
            ..Default::default()
        })
    }

    pub fn with_api_error(self, code: &str, message: &str) -> Self {
        self.with_response(GenerateImagesResponse {
            error: Some(ArkError {
                code: code.to_string(),
                message: message.to_string(),
            }),
            ..Default::default()
        })
    }

    pub fn with_response(self, response: GenerateImagesResponse) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<GenerateImagesRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_images(
        &self,
        request: &GenerateImagesRequest,
    ) -> Result<GenerateImagesResponse> {
        let call_index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Backend(
                "failed to call GenerateImages API: mock transport failure".to_string(),
            ));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(GenerateImagesResponse::default())
        } else {
            Ok(responses[call_index % responses.len()].clone())
        }
    }
}
