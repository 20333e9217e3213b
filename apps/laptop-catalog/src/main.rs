//! Laptop Catalog Binary
//!
//! Starts the laptop catalog gRPC service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin laptop-catalog
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_GRPC_PORT`: gRPC server port (default: 50051)
//! - `CATALOG_HEALTH_PORT`: Health check HTTP port, 0 disables it (default: 8081)
//! - `CATALOG_STREAM_BUFFER`: Response channel capacity per streaming call (default: 128)
//! - `CATALOG_IMAGE_DIR`: Directory for uploaded images (default: img)
//! - `CATALOG_MAX_IMAGE_BYTES`: Largest accepted image (default: 1048576)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: laptop-catalog)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use laptop_catalog::application::ports::{ImageStore, LaptopStore, RatingStore};
use laptop_catalog::infrastructure::telemetry;
use laptop_catalog::{
    CatalogConfig, CatalogService, DiskImageStore, HealthServer, HealthServerState,
    InMemoryLaptopStore, InMemoryRatingStore, LaptopServer, LaptopServiceServer, init_metrics,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init().context("failed to initialize telemetry")?;

    tracing::info!("Starting laptop catalog");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let config = CatalogConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Stores
    let laptops: Arc<dyn LaptopStore> = Arc::new(InMemoryLaptopStore::new());
    let images: Arc<dyn ImageStore> =
        Arc::new(DiskImageStore::new(config.storage.image_dir.clone()));
    let ratings: Arc<dyn RatingStore> = Arc::new(InMemoryRatingStore::new());

    let service = CatalogService::new(Arc::clone(&laptops), Arc::clone(&images), ratings)
        .with_max_image_size(config.storage.max_image_bytes);

    // Health server
    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        laptops,
        images,
    ));
    if config.server.health_port != 0 {
        let health_server = HealthServer::new(
            config.server.health_port,
            Arc::clone(&health_state),
            shutdown_token.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = health_server.run().await {
                tracing::error!(error = %e, "Health server error");
            }
        });
    }

    // gRPC server
    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.server.grpc_port));
    let listener = TcpListener::bind(grpc_addr)
        .await
        .with_context(|| format!("failed to bind gRPC listener on {grpc_addr}"))?;
    let grpc_service = LaptopServiceServer::new(
        LaptopServer::new(service).with_stream_buffer(config.server.stream_buffer),
    );
    let grpc_shutdown = shutdown_token.clone();

    let grpc_task = tokio::spawn(async move {
        tracing::info!(addr = %grpc_addr, "gRPC server listening");
        if let Err(e) = Server::builder()
            .add_service(grpc_service)
            .serve_with_incoming_shutdown(
                TcpListenerStream::new(listener),
                grpc_shutdown.cancelled_owned(),
            )
            .await
        {
            tracing::error!(error = %e, "gRPC server error");
        }
        tracing::info!("gRPC server stopped");
    });

    health_state.set_ready(true);
    tracing::info!("Laptop catalog ready");

    await_shutdown(shutdown_token).await;
    health_state.set_ready(false);

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, grpc_task).await.is_err() {
        tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "gRPC server did not drain in time"
        );
    }

    tracing::info!("Laptop catalog stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &CatalogConfig) {
    tracing::info!(
        grpc_port = config.server.grpc_port,
        health_port = config.server.health_port,
        stream_buffer = config.server.stream_buffer,
        image_dir = %config.storage.image_dir.display(),
        max_image_bytes = config.storage.max_image_bytes,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
