//! Stateful per-frame tactical event detection.
//!
//! [`EventDetector`] consumes one [`TrackedFrame`] at a time together
//! with the possession assignment resolved for that frame, and emits
//! zero or more [`MatchEvent`]s plus a possession label. The detection
//! rules are independent and evaluated in a fixed order, so any subset
//! may fire on the same frame.
//!
//! Possession uses a *sticky carry-over*: when no player claims the
//! ball, the previously possessing team keeps the possession label. A
//! consequence is that a tackle is only registered at the moment a
//! player of the opposing team claims the ball -- the ball merely going
//! loose never counts as a tackle. This matches the behaviour the
//! heuristics were tuned against and is kept deliberately.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::track::{format_timestamp, PlayerId, Team, TrackedFrame};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Kind of a durable tactical event.
///
/// Dribbles are narrative-only and never appear in the durable event
/// log; see [`FrameReport::notes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Pass,
    Tackle,
    Shot,
    Goal,
}

/// A single tactical event, ordered by `frame_index` in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub frame_index: u64,
    /// Match clock at this frame, `minutes:seconds`.
    pub timestamp: String,
    pub kind: EventKind,
    pub description: String,
    /// Players involved, when the rule identifies them (pass: giver then
    /// receiver; tackle: the new possessor).
    pub actors: Vec<PlayerId>,
}

/// Everything the detector produced for one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Player marked as having the ball this frame, `None` when the
    /// ball is unclaimed. Unlike [`FrameReport::possession`] this never
    /// carries over; the renderer uses it to highlight the possessor.
    pub possessor: Option<PlayerId>,
    /// Possession label for this frame after carry-over. `None` only
    /// before any team has ever controlled the ball.
    pub possession: Option<Team>,
    /// Durable events, in rule-evaluation order.
    pub events: Vec<MatchEvent>,
    /// Narrative lines for this frame: every event description plus
    /// narrative-only observations such as dribbles. Consumed by the
    /// renderer as on-screen annotations.
    pub notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Carry-over state between consecutive frames of one analysis run.
///
/// One detector instance is allocated per job and discarded with it;
/// nothing is shared across jobs.
#[derive(Debug, Default)]
pub struct EventDetector {
    previous_possessor: Option<PlayerId>,
    previous_team: Option<Team>,
}

impl EventDetector {
    /// Fresh detector with no possession history (first-frame state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame and advance the carried state.
    ///
    /// `assigned` is the player resolved by the possession-assignment
    /// collaborator for this frame, or `None` when the ball is
    /// unclaimed.
    pub fn process(
        &mut self,
        frame: &TrackedFrame,
        assigned: Option<PlayerId>,
        config: &AnalysisConfig,
    ) -> FrameReport {
        let timestamp = format_timestamp(frame.frame_index, config.fps);

        // Sticky carry-over: an unclaimed ball inherits the previous team.
        let current_team = match assigned {
            Some(id) => frame.players.get(&id).map(|p| p.team),
            None => self.previous_team,
        };

        let mut events = Vec::new();
        let mut notes = Vec::new();

        // Pass: possession moved between two claimed players.
        if let (Some(prev), Some(cur)) = (self.previous_possessor, assigned) {
            if prev != cur {
                let description = format!("Pass completed: player {prev} to player {cur}");
                notes.push(description.clone());
                events.push(MatchEvent {
                    frame_index: frame.frame_index,
                    timestamp: timestamp.clone(),
                    kind: EventKind::Pass,
                    description,
                    actors: vec![prev, cur],
                });
            }
        }

        // Dribble: same player keeps the ball while moving quickly.
        // Narrative-only, never logged as a durable event.
        if let Some(cur) = assigned {
            if self.previous_possessor == Some(cur) {
                let speed = frame.players.get(&cur).map(|p| p.speed).unwrap_or(0.0);
                if speed > config.dribble_speed_threshold {
                    notes.push(format!("Player {cur} is on a dribble"));
                }
            }
        }

        // Tackle: possessing team changed. Because of carry-over this can
        // only happen at the moment a player of the other team claims the
        // ball, never on a loose-ball frame.
        if let Some(prev_team) = self.previous_team {
            if current_team != Some(prev_team) {
                let winner = current_team.map(Team::label).unwrap_or("unknown side");
                let description = format!("Tackle won: {winner} take the ball");
                notes.push(description.clone());
                events.push(MatchEvent {
                    frame_index: frame.frame_index,
                    timestamp: timestamp.clone(),
                    kind: EventKind::Tackle,
                    description,
                    actors: assigned.into_iter().collect(),
                });
            }
        }

        // Shot: ball speed strictly above the threshold, regardless of
        // possession.
        if frame.ball.speed > config.shot_speed_threshold {
            let description = format!(
                "Shot taken: ball moving at speed {:.1}",
                frame.ball.speed
            );
            notes.push(description.clone());
            events.push(MatchEvent {
                frame_index: frame.frame_index,
                timestamp: timestamp.clone(),
                kind: EventKind::Shot,
                description,
                actors: Vec::new(),
            });
        }

        // Goal: ball strictly inside the goal mouth, regardless of
        // possession.
        if config.goal_region.contains(frame.ball.bbox.min_corner()) {
            let description = "Goal! The ball is in the net".to_string();
            notes.push(description.clone());
            events.push(MatchEvent {
                frame_index: frame.frame_index,
                timestamp,
                kind: EventKind::Goal,
                description,
                actors: Vec::new(),
            });
        }

        self.previous_possessor = assigned;
        self.previous_team = current_team;

        FrameReport {
            possessor: assigned,
            possession: current_team,
            events,
            notes,
        }
    }

    /// The player carried over as possessor from the last processed frame.
    pub fn previous_possessor(&self) -> Option<PlayerId> {
        self.previous_possessor
    }

    /// The team carried over from the last processed frame.
    pub fn previous_team(&self) -> Option<Team> {
        self.previous_team
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
