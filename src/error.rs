//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror, plus
//! the mapping from service errors onto gRPC status codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Ark API error: {0}")]
    Backend(String),

    /// A single result image could not be fetched. Never returned to callers.
    #[error("Download error: {0}")]
    Download(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::Configuration(_) => tonic::Status::failed_precondition(message),
            Error::Upload(_) => tonic::Status::unavailable(message),
            _ => tonic::Status::internal(message),
        }
    }
}
