//! JSON HTTP API.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/api/health` | store mode |
//! | GET | `/api/prompts` | list projection, newest first |
//! | POST | `/api/prompts` | create a prompt |
//! | GET | `/api/prompts/{id}` | prompt with version contents |
//! | POST | `/api/ab-test` | placeholder comparison |
//! | POST | `/api/recommend` | rank the model catalog |
//! | GET | `/api/models` | model catalog |

mod error;
mod handlers;

pub use handlers::Health;

use crate::services::PromptService;
use crate::{Error, Result};
use axum::Router;
use axum::http::header;
use axum::routing::{get, post};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Prompt service over the configured store.
    pub service: PromptService,
}

impl AppState {
    /// Creates handler state.
    #[must_use]
    pub const fn new(service: PromptService) -> Self {
        Self { service }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/prompts",
            get(handlers::list_prompts).post(handlers::create_prompt),
        )
        .route("/api/prompts/{id}", get(handlers::get_prompt))
        .route("/api/ab-test", post(handlers::ab_test))
        .route("/api/recommend", post(handlers::recommend_model))
        .route("/api/models", get(handlers::list_models))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::operation("bind", format!("{addr}: {e}")))?;

    tracing::info!(
        %addr,
        mode = %state.service.mode(),
        atomicity = ?state.service.atomicity(),
        "PromptOps API listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::operation("serve", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
