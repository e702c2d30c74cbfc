//! Fetching generated images from the URLs the backend returns.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait ImageDownloader: Send + Sync {
    /// Fetch one image. Any failure is reported as [`Error::Download`].
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpImageDownloader {
    client: Client,
}

impl HttpImageDownloader {
    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageDownloader for HttpImageDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!(
                "received status code {} from {}",
                status.as_u16(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("failed to read body from {}: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/out/1.jpeg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
            .mount(&server)
            .await;

        let downloader = HttpImageDownloader::new_with_client(Client::new());
        let bytes = downloader
            .download(&format!("{}/out/1.jpeg", server.uri()))
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn test_download_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let downloader = HttpImageDownloader::new_with_client(Client::new());
        let err = downloader
            .download(&format!("{}/expired.jpeg", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_download_transport_failure() {
        let downloader = HttpImageDownloader::new_with_client(Client::new());
        let err = downloader
            .download("http://127.0.0.1:1/unreachable.jpeg")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download(_)));
    }
}
