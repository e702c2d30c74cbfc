pub mod client;
pub mod types;

pub use client::ArkImageClient;
pub use types::{
    ArkError, GenerateImagesRequest, GenerateImagesResponse, ImageData,
    SequentialImageGenerationOptions, RESPONSE_FORMAT_URL,
};
