//! Job status endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use leadlist_core::job::{Job, JobStatus};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub result_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
}

/// GET /jobs/{id} — compact status snapshot.
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state
        .registry
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("job {id} not found")))?;

    Ok(Json(JobStatusResponse {
        id: job.id,
        status: job.status,
        progress: job.progress,
        message: job.message,
        error: job.error,
        result_count: job.result_count,
        spreadsheet_url: job.spreadsheet_url,
    }))
}

/// GET /jobs/{id}/result — the full job record.
pub async fn job_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let job = state
        .registry
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("job {id} not found")))?;
    Ok(Json(job))
}
