use anyhow::Result;
use clap::Parser;
use gen_doubao_image::app::App;
use gen_doubao_image::grpc;
use gen_doubao_image::models::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gen-doubao-image")]
#[command(about = "gRPC service generating images with Doubao Seedream")]
struct CliArgs {
    /// Address the gRPC listener binds to.
    #[arg(long, env = "GRPC_LISTEN_ADDR", default_value = "0.0.0.0:50052")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gen_doubao_image=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gen-doubao-image");

    // Loads .env as well, so it has to run before clap reads GRPC_LISTEN_ADDR.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let args = CliArgs::parse();

    let app = match App::new(&config).await {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = grpc::serve(args.listen, app, config.max_message_bytes).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
    Ok(())
}
