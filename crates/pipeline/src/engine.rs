//! Tracking and rendering collaborator seams.
//!
//! Object detection/tracking and video annotation/transcoding run in an
//! external toolchain; the pipeline only needs their inputs and outputs.

use std::path::Path;

use serde::Serialize;

use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;
use matchlens_core::track::{PlayerId, TrackedFrame};

use crate::error::PipelineError;

/// Capability interface for the tracking collaborator: source media in,
/// one [`TrackedFrame`] per video frame out, ordered by frame index.
#[async_trait::async_trait]
pub trait TrackingEngine: Send + Sync {
    async fn track(&self, media: &Path) -> Result<Vec<TrackedFrame>, PipelineError>;
}

/// Reads pre-computed tracking output stored as a JSON array of
/// [`TrackedFrame`]s. Used when an upstream tracker has already
/// processed the media, and by the test suites.
pub struct JsonTrackSource;

#[async_trait::async_trait]
impl TrackingEngine for JsonTrackSource {
    async fn track(&self, media: &Path) -> Result<Vec<TrackedFrame>, PipelineError> {
        let raw = tokio::fs::read(media).await?;
        let frames: Vec<TrackedFrame> = serde_json::from_slice(&raw)?;
        Ok(frames)
    }
}

/// Everything the renderer needs to annotate the output artifact.
#[derive(Debug, Serialize)]
pub struct RenderPlan<'a> {
    pub events: &'a [MatchEvent],
    pub subtitles: &'a [CommentarySample],
    /// One entry per frame: the joined narrative lines for that frame
    /// (may be empty).
    pub frame_notes: &'a [String],
    /// One entry per frame: the player to highlight as the ball
    /// possessor, `None` when the ball was unclaimed.
    pub possessors: &'a [Option<PlayerId>],
}

/// Capability interface for the rendering/transcoding collaborator.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Produce the annotated output artifact at `output` from the
    /// source media and the render plan.
    async fn render(
        &self,
        media: &Path,
        plan: &RenderPlan<'_>,
        output: &Path,
    ) -> Result<(), PipelineError>;
}

/// Renderer that writes the annotation plan itself as JSON -- the output
/// artifact downstream overlay tooling consumes.
pub struct AnnotationWriter;

#[async_trait::async_trait]
impl Renderer for AnnotationWriter {
    async fn render(
        &self,
        _media: &Path,
        plan: &RenderPlan<'_>,
        output: &Path,
    ) -> Result<(), PipelineError> {
        let encoded = serde_json::to_vec_pretty(plan)?;
        tokio::fs::write(output, encoded).await?;
        Ok(())
    }
}
