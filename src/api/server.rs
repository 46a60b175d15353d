//! API server setup.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{extract_handler, health_handler};
use super::types::{ApiSizeLimits, ApiState};
use crate::{Doc2TextError, DocumentExtractor, ExtractionConfig};

/// Read `DOC2TEXT_MAX_UPLOAD_BYTES`, falling back to 100 MiB.
pub fn size_limits_from_env() -> ApiSizeLimits {
    match std::env::var("DOC2TEXT_MAX_UPLOAD_BYTES") {
        Ok(value) => match value.trim().parse::<usize>() {
            Ok(bytes) if bytes > 0 => {
                tracing::info!("Upload size limit from environment: {} bytes", bytes);
                ApiSizeLimits::new(bytes)
            }
            _ => {
                tracing::warn!(
                    "Ignoring DOC2TEXT_MAX_UPLOAD_BYTES='{}': must be a positive integer",
                    value
                );
                ApiSizeLimits::default()
            }
        },
        Err(_) => ApiSizeLimits::default(),
    }
}

/// Create the API router with default size limits.
///
/// Public so the routes can be nested inside a larger application.
pub fn create_router(extractor: Arc<DocumentExtractor>) -> Router {
    create_router_with_limits(extractor, ApiSizeLimits::default())
}

/// Create the API router with custom size limits.
///
/// Oversized bodies are rejected with 413 before any extraction starts.
pub fn create_router_with_limits(
    extractor: Arc<DocumentExtractor>,
    limits: ApiSizeLimits,
) -> Router {
    let state = ApiState { extractor };

    Router::new()
        .route("/extract", post(extract_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limits.max_request_body_bytes))
        .layer(RequestBodyLimitLayer::new(limits.max_request_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server and run until Ctrl-C.
///
/// # Example
/// ```no_run
/// use edgequake_doc2text::{api::serve, ExtractionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     serve("0.0.0.0", 8000, ExtractionConfig::from_env()?).await?;
///     Ok(())
/// }
/// ```
pub async fn serve(
    host: impl AsRef<str>,
    port: u16,
    config: ExtractionConfig,
) -> Result<(), Doc2TextError> {
    serve_with_limits(host, port, config, size_limits_from_env()).await
}

/// Start the API server with explicit size limits.
pub async fn serve_with_limits(
    host: impl AsRef<str>,
    port: u16,
    config: ExtractionConfig,
    limits: ApiSizeLimits,
) -> Result<(), Doc2TextError> {
    let host = host.as_ref();
    let extractor = Arc::new(DocumentExtractor::new(config)?);
    let app = create_router_with_limits(extractor, limits);

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|e| Doc2TextError::InvalidConfig(format!("Cannot bind {host}:{port}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| Doc2TextError::Internal(format!("listener address: {e}")))?;

    tracing::info!(
        "doc2text API listening on http://{} (max body {} bytes)",
        local,
        limits.max_request_body_bytes
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Doc2TextError::Internal(format!("server error: {e}")))?;

    tracing::info!("doc2text API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received, draining in-flight requests");
    }
}
