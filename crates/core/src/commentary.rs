//! Commentary sampling: cadence decision and snapshot building.
//!
//! The narrator is the slowest and most expensive collaborator, so
//! commentary is only requested at a fixed frame cadence rather than
//! every frame. This module builds the context snapshot sent with each
//! request; the actual narrator call happens in the pipeline crate.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::detector::MatchEvent;
use crate::possession::WindowStats;
use crate::track::{format_timestamp, PlayerId, Team};

/// Placeholder injected when no events fall inside the current window,
/// so the narrator always receives non-empty context.
pub const NO_NOTABLE_EVENTS: &str = "no notable events";

/// One line of sampled commentary, attached to the frame that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentarySample {
    pub frame_index: u64,
    /// Match clock at this frame, `minutes:seconds`.
    pub timestamp: String,
    pub text: String,
}

/// Decide whether commentary should be sampled at this frame.
pub fn should_sample(frame_index: u64, sampling_interval: u64) -> bool {
    frame_index % sampling_interval == 0
}

/// Context snapshot sent to the narrator for one commentary request.
#[derive(Debug, Clone)]
pub struct CommentarySnapshot {
    pub frame_index: u64,
    pub timestamp: String,
    /// Current possessor and their side, if the ball is claimed or
    /// carried over.
    pub possessor: Option<PlayerId>,
    pub possessing_team: Option<Team>,
    /// Speed of the current possessor (0 when unclaimed).
    pub player_speed: f64,
    pub ball_speed: f64,
    /// Possession split over the trailing window.
    pub window: WindowStats,
    /// Descriptions of the most recent events inside the window, oldest
    /// first. Empty means "nothing notable"; [`CommentarySnapshot::prompt`]
    /// substitutes the placeholder.
    pub recent_events: Vec<String>,
}

impl CommentarySnapshot {
    /// Assemble a snapshot for `frame_index`.
    ///
    /// `events` is the full durable event log so far; only events whose
    /// frame lies within the trailing possession window are considered,
    /// and at most `recent_event_limit` of the newest are kept.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        frame_index: u64,
        config: &AnalysisConfig,
        possessor: Option<PlayerId>,
        possessing_team: Option<Team>,
        player_speed: f64,
        ball_speed: f64,
        window: WindowStats,
        events: &[MatchEvent],
    ) -> Self {
        let window_start = frame_index.saturating_sub(config.possession_window as u64);
        let in_window: Vec<&MatchEvent> = events
            .iter()
            .filter(|e| e.frame_index >= window_start)
            .collect();
        let skip = in_window.len().saturating_sub(config.recent_event_limit);
        let recent_events = in_window[skip..]
            .iter()
            .map(|e| e.description.clone())
            .collect();

        Self {
            frame_index,
            timestamp: format_timestamp(frame_index, config.fps),
            possessor,
            possessing_team,
            player_speed,
            ball_speed,
            window,
            recent_events,
        }
    }

    /// Serialize the snapshot into the natural-language narrator request.
    pub fn prompt(&self) -> String {
        let possession = match (self.possessor, self.possessing_team) {
            (Some(id), Some(team)) => {
                format!("player {id} ({}) has the ball", team.label())
            }
            (None, Some(team)) => format!("{} retain loose-ball possession", team.label()),
            _ => "no side has established possession".to_string(),
        };
        let events = if self.recent_events.is_empty() {
            NO_NOTABLE_EVENTS.to_string()
        } else {
            self.recent_events.join("; ")
        };
        format!(
            "At {} (frame {}), {}. Player speed {:.2}, ball speed {:.2}. \
             Possession over the recent window: {}. Recent events: {}. \
             Provide one line of live commentary for this moment.",
            self.timestamp,
            self.frame_index,
            possession,
            self.player_speed,
            self.ball_speed,
            self.window.describe(),
            events,
        )
    }
}
