//! gRPC surface: the `GenDoubaoImage` service and its listener.

use crate::app::App;
use crate::models::GenerationRequest;
use crate::Result;
use proto::gen_doubao_image_server::{GenDoubaoImage, GenDoubaoImageServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;

// Include the generated protobuf code
#[allow(clippy::all)]
pub mod proto {
    #![allow(clippy::all, unused_qualifications)]
    tonic::include_proto!("gen_doubao_image");
}

impl From<proto::GenDoubaoImageRequest> for GenerationRequest {
    fn from(request: proto::GenDoubaoImageRequest) -> Self {
        Self {
            prompt: request.prompt,
            images: request.images,
            size: request.size,
            watermark: request.watermark,
            sequential_image_generation: request.sequential_image_generation,
            max_images: request.max_images,
        }
    }
}

pub struct GenDoubaoImageService {
    app: Arc<App>,
}

impl GenDoubaoImageService {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }
}

#[tonic::async_trait]
impl GenDoubaoImage for GenDoubaoImageService {
    async fn generate_image(
        &self,
        request: Request<proto::GenDoubaoImageRequest>,
    ) -> std::result::Result<Response<proto::GenDoubaoImageResponse>, Status> {
        let request = GenerationRequest::from(request.into_inner());
        let result = self.app.generate(&request).await?;

        Ok(Response::new(proto::GenDoubaoImageResponse {
            images: result.images,
        }))
    }
}

/// Wrap the handler in a tonic service with message limits applied in both
/// directions.
pub fn service(
    app: Arc<App>,
    max_message_bytes: usize,
) -> GenDoubaoImageServer<GenDoubaoImageService> {
    GenDoubaoImageServer::new(GenDoubaoImageService::new(app))
        .max_decoding_message_size(max_message_bytes)
        .max_encoding_message_size(max_message_bytes)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Arc<App>, max_message_bytes: usize) -> Result<()> {
    info!("Server listening at {}", addr);

    tonic::transport::Server::builder()
        .add_service(service(app, max_message_bytes))
        .serve_with_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await?;

    Ok(())
}
