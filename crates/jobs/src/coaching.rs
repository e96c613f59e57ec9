//! Coaching report generation from a job's durable aggregates.

use matchlens_core::coaching::CoachingRequest;
use matchlens_core::commentary::CommentarySample;
use matchlens_core::detector::MatchEvent;
use matchlens_core::possession::PossessionTotals;
use matchlens_core::track::Team;
use matchlens_narrator::{narrate_with_fallback, Narrator, COACHING_FALLBACK};

/// Build the coaching prompt from stored aggregates and invoke the
/// narrator, degrading to the fixed fallback on failure.
///
/// Called once at job completion (neutral perspective) and again on
/// demand for perspective-specific reports.
pub async fn generate(
    possession: PossessionTotals,
    subtitles: &[CommentarySample],
    events: &[MatchEvent],
    perspective: Option<Team>,
    narrator: &dyn Narrator,
) -> String {
    let request = CoachingRequest {
        possession,
        commentary: subtitles.iter().map(|s| s.text.clone()).collect(),
        event_descriptions: events.iter().map(|e| e.description.clone()).collect(),
        perspective,
    };
    narrate_with_fallback(narrator, &request.prompt(), COACHING_FALLBACK).await
}
