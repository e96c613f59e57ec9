//! Handlers for the `/analyses` resource.
//!
//! Submitting an analysis creates a job record and spawns its worker;
//! all later interaction (polling, cancellation, coaching reports) goes
//! through the shared [`matchlens_jobs::JobRegistry`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;
use matchlens_core::track::Team;
use matchlens_core::CoreError;
use matchlens_jobs::{coaching, worker, AnalysisResult, JobRecord, JobStatus};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job record or map the miss to a 404.
fn find_job(state: &AppState, id: Uuid) -> AppResult<JobRecord> {
    state.registry.get(id).ok_or(AppError::Core(CoreError::NotFound {
        entity: "Analysis",
        id: id.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitAnalysis {
    /// Media-store key of the source recording.
    pub source_key: String,
}

#[derive(Debug, Serialize)]
pub struct SubmittedAnalysis {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// POST /api/v1/analyses
///
/// Submit a recording for analysis. Returns 201 with the job id; the
/// job starts in `queued` status and runs in the background.
pub async fn submit_analysis(
    State(state): State<AppState>,
    Json(input): Json<SubmitAnalysis>,
) -> AppResult<impl IntoResponse> {
    if input.source_key.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "source_key must not be empty".to_string(),
        )));
    }

    let job_id = state.registry.create(input.source_key.clone());
    worker::spawn(Arc::clone(&state.registry), Arc::clone(&state.worker), job_id);

    tracing::info!(job_id = %job_id, source_key = %input.source_key, "Analysis submitted");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedAnalysis {
                job_id,
                status: JobStatus::Queued,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// Status view of one analysis. The payload shape depends on where the
/// job is in its lifecycle; only the fields relevant to that phase are
/// serialized.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalysisView {
    Running {
        job_id: Uuid,
        status: JobStatus,
        stage: String,
        progress: u8,
        live_events: Vec<MatchEvent>,
        live_subtitles: Vec<CommentarySample>,
    },
    Done {
        job_id: Uuid,
        status: JobStatus,
        result: AnalysisResult,
    },
    Failed {
        job_id: Uuid,
        status: JobStatus,
        error: String,
    },
    Cancelled {
        job_id: Uuid,
        status: JobStatus,
    },
}

impl From<JobRecord> for AnalysisView {
    fn from(record: JobRecord) -> Self {
        match record.status {
            JobStatus::Done => match record.result {
                Some(result) => AnalysisView::Done {
                    job_id: record.id,
                    status: record.status,
                    result,
                },
                // A done job always carries a result; treat a missing
                // one as an error view rather than panicking.
                None => AnalysisView::Failed {
                    job_id: record.id,
                    status: JobStatus::Error,
                    error: "result missing for completed analysis".to_string(),
                },
            },
            JobStatus::Error => AnalysisView::Failed {
                job_id: record.id,
                status: record.status,
                error: record
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
            JobStatus::Cancelled => AnalysisView::Cancelled {
                job_id: record.id,
                status: record.status,
            },
            _ => AnalysisView::Running {
                job_id: record.id,
                status: record.status,
                stage: record.stage,
                progress: record.progress,
                live_events: record.live_events,
                live_subtitles: record.live_subtitles,
            },
        }
    }
}

/// GET /api/v1/analyses/{id}
///
/// Poll one analysis. Running jobs expose stage, progress and the live
/// event/commentary buffers; terminal jobs expose their outcome.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let record = find_job(&state, job_id)?;
    Ok(Json(DataResponse {
        data: AnalysisView::from(record),
    }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CancelOutcome {
    pub job_id: Uuid,
    /// Status observed when the cancel request was recorded. The job
    /// moves to `cancelled` only once the worker honours the flag.
    pub status: JobStatus,
}

/// POST /api/v1/analyses/{id}/cancel
///
/// Request cooperative cancellation. Idempotent: cancelling a terminal
/// job is a no-op that reports the terminal status.
pub async fn cancel_analysis(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let status = state
        .registry
        .request_cancel(job_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Analysis",
            id: job_id.to_string(),
        }))?;

    Ok(Json(DataResponse {
        data: CancelOutcome { job_id, status },
    }))
}

// ---------------------------------------------------------------------------
// Coaching report
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CoachingParams {
    /// Slant the report toward one team; omit for a neutral report.
    #[serde(default)]
    pub perspective: Option<Team>,
}

#[derive(Debug, Serialize)]
pub struct CoachingReport {
    pub job_id: Uuid,
    pub perspective: Option<Team>,
    pub report: String,
}

/// POST /api/v1/analyses/{id}/coaching
///
/// Generate a coaching report from a completed analysis's stored
/// aggregates. Re-requestable with different perspectives without
/// re-running frame analysis. 409 unless the job is `done`.
pub async fn coaching_report(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(params): Json<CoachingParams>,
) -> AppResult<impl IntoResponse> {
    let record = find_job(&state, job_id)?;

    if record.status != JobStatus::Done {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Analysis is {}; coaching reports require a completed analysis",
            record.status
        ))));
    }
    let result = record.result.ok_or(AppError::InternalError(
        "result missing for completed analysis".to_string(),
    ))?;

    let report = coaching::generate(
        result.possession,
        &result.subtitles,
        &result.events,
        params.perspective,
        state.worker.narrator.as_ref(),
    )
    .await;

    Ok(Json(DataResponse {
        data: CoachingReport {
            job_id,
            perspective: params.perspective,
            report,
        },
    }))
}
