//! HTTP surface
//!
//! - `GET /` plain-text banner
//! - `GET /health` database connectivity
//! - `POST /api/upload` start loading the configured CSV file

pub mod upload;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use census_ingest::IngestPipeline;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::IngestSettings;
use crate::{db, middleware};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub pipeline: Arc<IngestPipeline>,
    pub ingest: Arc<IngestSettings>,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new().route("/upload", post(upload::start_upload));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(middleware::tracing_layer())
}

async fn root() -> &'static str {
    "CSV Processor API is running. POST to /api/upload to start processing."
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match db::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "connected" })),
        ),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "database": "unreachable" })),
            )
        }
    }
}
