//! leadlist HTTP API server.
//!
//! Exposes the core pipeline as a REST API: bulk scraping, a synchronous
//! full-pipeline endpoint, and an asynchronous job-based variant with
//! status polling.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the complete axum router with all API routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/scrape", post(routes::scrape::scrape))
        .route("/search_sync", post(routes::search::search_sync))
        .route("/search", post(routes::search::search_async))
        .route("/jobs/{id}", get(routes::jobs::job_status))
        .route("/jobs/{id}/result", get(routes::jobs::job_result))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
