//! Shared in-memory job registry.
//!
//! One writer (the job's worker) and many polling readers access each
//! record concurrently; all access goes through the registry's lock so
//! readers never observe a torn update. Lock sections are short -- every
//! read hands out a clone.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;

use crate::record::{AnalysisResult, JobRecord};
use crate::status::JobStatus;

/// Thread-safe map of job id → record. Shared via `Arc` between the
/// HTTP handlers and the workers.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job in `queued` state and return its id.
    pub fn create(&self, source_key: String) -> Uuid {
        let id = Uuid::new_v4();
        let record = JobRecord::new(id, source_key);
        self.jobs.write().expect("job registry lock poisoned").insert(id, record);
        tracing::info!(job_id = %id, "Job created");
        id
    }

    /// Atomic snapshot of one job's state.
    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().expect("job registry lock poisoned").get(&id).cloned()
    }

    /// Move a job to `status` if the state machine allows it.
    ///
    /// Illegal transitions (including any attempt to leave a terminal
    /// state) are rejected and logged, leaving the record unchanged.
    pub fn set_status(&self, id: Uuid, status: JobStatus) -> bool {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        let Some(record) = jobs.get_mut(&id) else {
            tracing::warn!(job_id = %id, "set_status on unknown job");
            return false;
        };
        if !record.status.can_transition_to(status) {
            tracing::warn!(
                job_id = %id,
                from = %record.status,
                to = %status,
                "Rejected illegal status transition",
            );
            return false;
        }
        tracing::info!(job_id = %id, from = %record.status, to = %status, "Job status changed");
        record.status = status;
        record.stage = status.as_str().to_string();
        true
    }

    /// Refine the sub-stage label without changing status.
    pub fn set_stage(&self, id: Uuid, stage: &str) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        if let Some(record) = jobs.get_mut(&id) {
            if !record.status.is_terminal() {
                record.stage = stage.to_string();
            }
        }
    }

    /// Update the progress percentage. Progress never decreases and is
    /// capped at 100; stale (lower) writes are ignored.
    pub fn set_progress(&self, id: Uuid, percent: u8) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        if let Some(record) = jobs.get_mut(&id) {
            if !record.status.is_terminal() && percent > record.progress {
                record.progress = percent.min(100);
            }
        }
    }

    /// Append a detected event to the job's live buffer.
    pub fn push_event(&self, id: Uuid, event: &MatchEvent) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        if let Some(record) = jobs.get_mut(&id) {
            record.live_events.push(event.clone());
        }
    }

    /// Append a commentary sample to the job's live buffer.
    pub fn push_subtitle(&self, id: Uuid, sample: &CommentarySample) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        if let Some(record) = jobs.get_mut(&id) {
            record.live_subtitles.push(sample.clone());
        }
    }

    /// Request cooperative cancellation.
    ///
    /// Idempotent: for a terminal job this is a no-op that returns the
    /// existing status. For a running job it only raises the flag -- the
    /// worker honours it at its single checkpoint.
    pub fn request_cancel(&self, id: Uuid) -> Option<JobStatus> {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        let record = jobs.get_mut(&id)?;
        if !record.status.is_terminal() && !record.cancel_requested {
            record.cancel_requested = true;
            tracing::info!(job_id = %id, status = %record.status, "Cancellation requested");
        }
        Some(record.status)
    }

    /// Whether cancellation has been requested for this job.
    pub fn cancel_requested(&self, id: Uuid) -> bool {
        self.jobs
            .read()
            .expect("job registry lock poisoned")
            .get(&id)
            .map(|r| r.cancel_requested)
            .unwrap_or(false)
    }

    /// Terminal success: store the result and move to `done`.
    pub fn complete(&self, id: Uuid, result: AnalysisResult) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        let Some(record) = jobs.get_mut(&id) else { return };
        if !record.status.can_transition_to(JobStatus::Done) {
            tracing::warn!(job_id = %id, status = %record.status, "complete on non-completable job");
            return;
        }
        record.status = JobStatus::Done;
        record.stage = "done".to_string();
        record.progress = 100;
        record.result = Some(result);
        tracing::info!(job_id = %id, "Job completed");
    }

    /// Terminal failure: record the message verbatim, retain no partial
    /// result.
    pub fn fail(&self, id: Uuid, message: String) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        let Some(record) = jobs.get_mut(&id) else { return };
        if !record.status.can_transition_to(JobStatus::Error) {
            return;
        }
        tracing::error!(job_id = %id, error = %message, "Job failed");
        record.status = JobStatus::Error;
        record.stage = "error".to_string();
        record.result = None;
        record.error = Some(message);
    }

    /// Terminal cancellation (worker-side, after the checkpoint fired).
    pub fn mark_cancelled(&self, id: Uuid) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        let Some(record) = jobs.get_mut(&id) else { return };
        if !record.status.can_transition_to(JobStatus::Cancelled) {
            return;
        }
        record.status = JobStatus::Cancelled;
        record.stage = "cancelled".to_string();
        record.result = None;
        tracing::info!(job_id = %id, "Job cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_queued_with_zero_progress() {
        let registry = JobRegistry::new();
        let id = registry.create("uploads/match.json".to_string());
        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Queued);
        assert_eq!(record.progress, 0);
        assert!(!record.cancel_requested);
        assert_eq!(record.source_key, "uploads/match.json");
    }

    #[test]
    fn unknown_job_reads_as_none() {
        let registry = JobRegistry::new();
        assert!(registry.get(Uuid::new_v4()).is_none());
        assert!(registry.request_cancel(Uuid::new_v4()).is_none());
    }

    #[test]
    fn status_moves_forward_and_rejects_backwards() {
        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        assert!(registry.set_status(id, JobStatus::Downloading));
        assert!(registry.set_status(id, JobStatus::Analyzing));
        assert!(!registry.set_status(id, JobStatus::Downloading));
        assert_eq!(registry.get(id).unwrap().status, JobStatus::Analyzing);
    }

    #[test]
    fn progress_is_non_decreasing() {
        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        registry.set_status(id, JobStatus::Analyzing);
        registry.set_progress(id, 40);
        registry.set_progress(id, 30); // stale write, ignored
        assert_eq!(registry.get(id).unwrap().progress, 40);
        registry.set_progress(id, 90);
        assert_eq!(registry.get(id).unwrap().progress, 90);
    }

    #[test]
    fn cancel_on_running_job_raises_flag_only() {
        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        registry.set_status(id, JobStatus::Downloading);
        let status = registry.request_cancel(id).unwrap();
        assert_eq!(status, JobStatus::Downloading);
        let record = registry.get(id).unwrap();
        assert!(record.cancel_requested);
        assert_eq!(record.status, JobStatus::Downloading);
    }

    #[test]
    fn cancel_on_terminal_job_is_a_noop_returning_status() {
        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        registry.set_status(id, JobStatus::Downloading);
        registry.mark_cancelled(id);
        assert_eq!(registry.request_cancel(id), Some(JobStatus::Cancelled));
        // Repeated cancels keep returning the same terminal status.
        assert_eq!(registry.request_cancel(id), Some(JobStatus::Cancelled));
    }

    #[test]
    fn fail_records_message_and_drops_partial_result() {
        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        registry.set_status(id, JobStatus::Analyzing);
        registry.fail(id, "Tracking failed: corrupt payload".to_string());
        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Error);
        assert_eq!(record.error.as_deref(), Some("Tracking failed: corrupt payload"));
        assert!(record.result.is_none());
    }

    #[test]
    fn terminal_status_is_never_overwritten() {
        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        registry.set_status(id, JobStatus::Downloading);
        registry.mark_cancelled(id);
        registry.fail(id, "late failure".to_string());
        let record = registry.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Cancelled);
        assert!(record.error.is_none());
    }

    #[test]
    fn live_buffers_accumulate() {
        use matchlens_core::detector::EventKind;

        let registry = JobRegistry::new();
        let id = registry.create("k".to_string());
        let event = MatchEvent {
            frame_index: 3,
            timestamp: "0:00".to_string(),
            kind: EventKind::Shot,
            description: "Shot taken".to_string(),
            actors: vec![],
        };
        registry.push_event(id, &event);
        let sample = CommentarySample {
            frame_index: 0,
            timestamp: "0:00".to_string(),
            text: "kick-off".to_string(),
        };
        registry.push_subtitle(id, &sample);

        let record = registry.get(id).unwrap();
        assert_eq!(record.live_events.len(), 1);
        assert_eq!(record.live_subtitles.len(), 1);
    }
}
