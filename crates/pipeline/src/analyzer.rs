//! The per-frame analysis loop.
//!
//! Single pass over the tracked frames: possession assignment, event
//! detection, possession aggregation and commentary sampling, with live
//! buffers and progress updated along the way. Narration failures are
//! absorbed here and never fail the loop.

use matchlens_core::commentary::{should_sample, CommentarySample, CommentarySnapshot};
use matchlens_core::config::AnalysisConfig;
use matchlens_core::detector::{EventDetector, MatchEvent};
use matchlens_core::possession::{PossessionLedger, PossessionTotals};
use matchlens_core::track::{PlayerId, Team, TrackedFrame};
use matchlens_narrator::{narrate_with_fallback, Narrator, COMMENTARY_FALLBACK};

use crate::assign::PossessionAssigner;
use crate::progress::{LiveSink, ProgressSink};

/// Stage label reported while the frame loop runs.
pub const STAGE_EVENT_LOOP: &str = "detecting events";

/// Aggregates produced by one pass over the frames.
#[derive(Debug)]
pub struct MatchAnalysis {
    /// Durable event log, ordered by frame index.
    pub events: Vec<MatchEvent>,
    /// Final possession split.
    pub possession: PossessionTotals,
    /// Per-frame possession labels (same length as the frame sequence).
    pub possession_samples: Vec<Option<Team>>,
    /// Per-frame ball possessor markers, for the renderer's overlay.
    pub possessors: Vec<Option<PlayerId>>,
    /// Sampled commentary, in match order.
    pub subtitles: Vec<CommentarySample>,
    /// Joined narrative lines per frame, for the renderer.
    pub frame_notes: Vec<String>,
}

/// Run the analysis loop over an ordered frame sequence.
///
/// Progress is mapped linearly across the configured frame-loop range
/// and written every `progress_stride` frames plus once at the end, to
/// bound write contention with polling readers.
pub async fn analyze_frames(
    frames: &[TrackedFrame],
    config: &AnalysisConfig,
    assigner: &dyn PossessionAssigner,
    narrator: &dyn Narrator,
    progress: &dyn ProgressSink,
    live: &dyn LiveSink,
) -> MatchAnalysis {
    let mut detector = EventDetector::new();
    let mut ledger = PossessionLedger::new();
    let mut events: Vec<MatchEvent> = Vec::new();
    let mut subtitles: Vec<CommentarySample> = Vec::new();
    let mut frame_notes: Vec<String> = Vec::with_capacity(frames.len());
    let mut possessors: Vec<Option<PlayerId>> = Vec::with_capacity(frames.len());

    let total = frames.len();
    let span = (config.frame_loop_progress_end - config.frame_loop_progress_start) as u64;

    for (i, frame) in frames.iter().enumerate() {
        let assigned = assigner.assign(&frame.players, &frame.ball);
        let report = detector.process(frame, assigned, config);

        ledger.record(report.possession);
        possessors.push(report.possessor);
        frame_notes.push(report.notes.join("\n"));
        for event in report.events {
            live.push_event(&event);
            events.push(event);
        }

        if should_sample(frame.frame_index, config.sampling_interval) {
            let player_speed = assigned
                .and_then(|id| frame.players.get(&id))
                .map(|p| p.speed)
                .unwrap_or(0.0);
            let snapshot = CommentarySnapshot::build(
                frame.frame_index,
                config,
                assigned,
                report.possession,
                player_speed,
                frame.ball.speed,
                ledger.window(config.possession_window),
                &events,
            );
            let text =
                narrate_with_fallback(narrator, &snapshot.prompt(), COMMENTARY_FALLBACK).await;
            let sample = CommentarySample {
                frame_index: frame.frame_index,
                timestamp: snapshot.timestamp,
                text,
            };
            live.push_subtitle(&sample);
            subtitles.push(sample);
        }

        let is_last = i + 1 == total;
        if i as u64 % config.progress_stride == 0 || is_last {
            let percent =
                config.frame_loop_progress_start + (span * (i as u64 + 1) / total as u64) as u8;
            progress.update(STAGE_EVENT_LOOP, percent);
        }
    }

    if total == 0 {
        progress.update(STAGE_EVENT_LOOP, config.frame_loop_progress_end);
    }

    tracing::debug!(
        frames = total,
        events = events.len(),
        subtitles = subtitles.len(),
        "Frame loop finished",
    );

    MatchAnalysis {
        possession: ledger.totals(),
        possession_samples: ledger.samples().to_vec(),
        possessors,
        events,
        subtitles,
        frame_notes,
    }
}
