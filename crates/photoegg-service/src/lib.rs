//! PhotoEgg HTTP service.
//!
//! A thin axum layer over [`photoegg_core::Pipeline`]: uploads arrive as
//! multipart forms and are processed on the blocking pool, at most
//! `max_concurrent_jobs` at a time.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use photoegg_core::Pipeline;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServiceConfig;
pub use error::ApiError;

/// Shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub jobs: Arc<Semaphore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: &ServiceConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            jobs: Arc::new(Semaphore::new(config.concurrent_jobs())),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/v1/process", post(routes::process))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
