//! Data models and configuration
//!
//! Defines the request/result types that flow through the handler and the
//! process configuration loaded once at startup.

use crate::{Error, Result};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "doubao-seedream-4-0-250828";
pub const DEFAULT_ARK_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
pub const DEFAULT_SEQUENTIAL_MODE: &str = "auto";

/// One `GenerateImage` call, decoupled from the protobuf message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub images: Vec<Vec<u8>>,
    pub size: String,
    pub watermark: bool,
    pub sequential_image_generation: String,
    pub max_images: i32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Caller's sequential mode, or `auto` when none was given.
    pub fn sequential_mode(&self) -> &str {
        if self.sequential_image_generation.is_empty() {
            DEFAULT_SEQUENTIAL_MODE
        } else {
            &self.sequential_image_generation
        }
    }
}

/// An input image uploaded to object storage for the duration of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub key: String,
    pub url: String,
}

/// Downloaded output images in backend order. Failed downloads are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResult {
    pub images: Vec<Vec<u8>>,
}

/// Fully resolved object-storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    /// S3-compatible TOS endpoint (`https://tos-s3-<region>.volces.com`).
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub presign_expires: Duration,
}

/// Raw object-storage settings; only usable once all five are present.
#[derive(Debug, Clone, Default)]
pub struct StorageSettings {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
}

impl StorageSettings {
    /// Names of the environment variables that are unset or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("TOS_ACCESS_KEY", &self.access_key),
            ("TOS_SECRET_KEY", &self.secret_key),
            ("TOS_ENDPOINT", &self.endpoint),
            ("TOS_REGION", &self.region),
            ("TOS_BUCKET_NAME", &self.bucket),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn resolve(&self, presign_expires: Duration) -> Result<StorageConfig> {
        match (
            &self.access_key,
            &self.secret_key,
            &self.endpoint,
            &self.region,
            &self.bucket,
        ) {
            (Some(access_key), Some(secret_key), Some(endpoint), Some(region), Some(bucket)) => {
                Ok(StorageConfig {
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                    endpoint: s3_compatible_endpoint(endpoint),
                    region: region.clone(),
                    bucket: bucket.clone(),
                    presign_expires,
                })
            }
            _ => Err(Error::Configuration(format!(
                "TOS environment variables not fully configured (missing: {})",
                self.missing().join(", ")
            ))),
        }
    }
}

/// Map a TOS endpoint onto its S3-compatible form.
///
/// `TOS_ENDPOINT` may hold the native endpoint (`tos-cn-beijing.volces.com`),
/// which only accepts TOS-signed requests. The S3 client signs with SigV4, so
/// a native `tos-` host becomes `tos-s3-`. A bare host gets an `https://`
/// scheme. Any other host is used as given.
pub fn s3_compatible_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let (scheme, host) = match endpoint.split_once("://") {
        Some((scheme, host)) => (scheme, host),
        None => ("https", endpoint),
    };

    match host.strip_prefix("tos-") {
        Some(rest) if !rest.starts_with("s3-") => {
            let rewritten = format!("{}://tos-s3-{}", scheme, rest);
            tracing::info!(
                "TOS_ENDPOINT {} is a native TOS endpoint, using {} for S3 access",
                endpoint,
                rewritten
            );
            rewritten
        }
        _ => format!("{}://{}", scheme, host),
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub ark_api_key: Option<String>,
    pub model: String,
    pub ark_base_url: String,
    pub ark_timeout: Duration,
    pub download_timeout: Duration,
    pub storage: StorageSettings,
    pub presign_expires: Duration,
    pub max_message_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            ark_api_key: get("ARK_API_KEY"),
            model: get("DOUBAO_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ark_base_url: get("ARK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ARK_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            ark_timeout: Duration::from_secs(parse_or(
                get("ARK_TIMEOUT_SECS"),
                "ARK_TIMEOUT_SECS",
                180,
            )?),
            download_timeout: Duration::from_secs(parse_or(
                get("DOWNLOAD_TIMEOUT_SECS"),
                "DOWNLOAD_TIMEOUT_SECS",
                60,
            )?),
            storage: StorageSettings {
                access_key: get("TOS_ACCESS_KEY"),
                secret_key: get("TOS_SECRET_KEY"),
                endpoint: get("TOS_ENDPOINT"),
                region: get("TOS_REGION"),
                bucket: get("TOS_BUCKET_NAME"),
            },
            presign_expires: Duration::from_secs(parse_or(
                get("TOS_PRESIGN_EXPIRES_SECS"),
                "TOS_PRESIGN_EXPIRES_SECS",
                3600,
            )?),
            max_message_bytes: parse_or(
                get("GRPC_MAX_MESSAGE_BYTES"),
                "GRPC_MAX_MESSAGE_BYTES",
                64 * 1024 * 1024,
            )?,
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.ark_api_key.as_deref().ok_or_else(|| {
            Error::Configuration("ARK_API_KEY environment variable not set".to_string())
        })
    }

    pub fn storage_config(&self) -> Result<StorageConfig> {
        self.storage.resolve(self.presign_expires)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Configuration(format!("{} has invalid value '{}'", name, raw))),
        None => Ok(default),
    }
}
