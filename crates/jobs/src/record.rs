//! Job record and final result types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;
use matchlens_core::possession::PossessionTotals;

use crate::status::JobStatus;

/// Everything a completed analysis produced. These aggregates are
/// durable for the life of the job record, which is what makes
/// perspective-specific coaching reports re-requestable without
/// re-running frame analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub events: Vec<MatchEvent>,
    pub possession: PossessionTotals,
    pub subtitles: Vec<CommentarySample>,
    /// Default (neutral-perspective) coaching report.
    pub coaching: String,
    /// Where the rendered output artifact was uploaded.
    pub output_url: String,
}

/// One job's full state. Owned exclusively by the [`crate::JobRegistry`];
/// readers get clones.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Human-readable sub-stage label, refined within `analyzing`.
    pub stage: String,
    /// Non-decreasing progress percentage in `0..=100`.
    pub progress: u8,
    /// Set by a cancel request; honoured at the worker's single
    /// cancellation checkpoint.
    pub cancel_requested: bool,
    /// Media-store key of the source object.
    pub source_key: String,
    /// Events detected so far, exposed while the job is running.
    pub live_events: Vec<MatchEvent>,
    /// Commentary sampled so far, exposed while the job is running.
    pub live_subtitles: Vec<CommentarySample>,
    /// Populated only when `status == Done`.
    pub result: Option<AnalysisResult>,
    /// Populated only when `status == Error`.
    pub error: Option<String>,
}

impl JobRecord {
    /// Fresh record in `queued` state.
    pub fn new(id: Uuid, source_key: String) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            stage: "queued".to_string(),
            progress: 0,
            cancel_requested: false,
            source_key,
            live_events: Vec::new(),
            live_subtitles: Vec::new(),
            result: None,
            error: None,
        }
    }
}
