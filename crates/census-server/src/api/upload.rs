//! `POST /api/upload`
//!
//! Validates the configured path synchronously, then starts the load on a
//! background task and answers `202 Accepted` straight away. How the load
//! ends is only visible in the server log.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use census_ingest::spawn_ingestion;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;

pub const ACCEPTED_MESSAGE: &str = "CSV processing started. This is a long-running task. \
Check the server console for progress and the final report.";

pub async fn start_upload(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let Some(path) = state.ingest.csv_file_path.clone() else {
        error!("CSV_FILE_PATH not configured");
        return Err(AppError::Config("CSV file path is not defined.".to_string()));
    };

    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        error!(path = %path.display(), "File not found at configured path");
        return Err(AppError::NotFound(format!(
            "File not found at path: {}",
            path.display()
        )));
    }

    let job_id = Uuid::new_v4();
    info!(%job_id, path = %path.display(), "Starting background CSV processing");
    // Detached: the handle is dropped and the run outlives the request.
    spawn_ingestion(state.pipeline.clone(), path, job_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": ACCEPTED_MESSAGE,
            "job_id": job_id,
        })),
    ))
}
