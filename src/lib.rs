//! gRPC image generation service backed by Volcengine Ark (Doubao Seedream)
//!
//! Accepts a prompt and optional reference images, stages the references in
//! TOS object storage behind signed URLs, calls the Ark image API and returns
//! the generated images as raw bytes.

pub mod ai;
pub mod app;
pub mod download;
pub mod error;
pub mod grpc;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
