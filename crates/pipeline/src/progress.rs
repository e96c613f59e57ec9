//! Sinks the frame loop reports into while a job is running.
//!
//! The job orchestrator implements both traits on top of its registry;
//! tests use [`NullSink`] or capture into vectors.

use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;

/// Receives coarse stage labels and progress percentages.
pub trait ProgressSink: Send + Sync {
    fn update(&self, stage: &str, percent: u8);
}

/// Receives events and commentary as they are produced, so polling
/// clients can render partial progress before completion.
pub trait LiveSink: Send + Sync {
    fn push_event(&self, event: &MatchEvent);
    fn push_subtitle(&self, sample: &CommentarySample);
}

/// Sink that discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&self, _stage: &str, _percent: u8) {}
}

impl LiveSink for NullSink {
    fn push_event(&self, _event: &MatchEvent) {}
    fn push_subtitle(&self, _sample: &CommentarySample) {}
}
