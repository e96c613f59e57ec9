//! Frame-level tracking types produced by the external object tracker.
//!
//! One [`TrackedFrame`] arrives per video frame, strictly ordered by
//! `frame_index`. Players are keyed by their tracker-assigned id in a
//! `BTreeMap` so iteration order is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tracker-assigned player identifier.
pub type PlayerId = u32;

/// One of the two sides in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "team_a")]
    A,
    #[serde(rename = "team_b")]
    B,
}

impl Team {
    /// Wire/display label, e.g. `"team_a"`.
    pub fn label(self) -> &'static str {
        match self {
            Team::A => "team_a",
            Team::B => "team_b",
        }
    }

    /// The opposing side.
    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

/// A 2D point in pitch-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned bounding box from the object detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Geometric center of the box.
    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Bottom-center of the box -- where a player's feet touch the pitch.
    /// Used for player-to-ball distance measurement.
    pub fn foot_position(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    /// Top-left corner. The upstream tracker reports ball position via
    /// this corner, so goal-area containment is tested against it.
    pub fn min_corner(&self) -> Point {
        Point::new(self.x1, self.y1)
    }
}

/// Per-frame state of one tracked player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTrack {
    pub bbox: BoundingBox,
    /// Movement speed as estimated by the tracker (pitch units/frame window).
    pub speed: f64,
    /// Side assignment from the team classifier.
    pub team: Team,
}

/// Per-frame state of the ball.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallTrack {
    pub bbox: BoundingBox,
    pub speed: f64,
}

/// Everything the tracker observed in a single frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedFrame {
    pub frame_index: u64,
    pub players: BTreeMap<PlayerId, PlayerTrack>,
    pub ball: BallTrack,
}

/// Render a frame index as a `minutes:seconds` match clock string.
///
/// `fps` must be positive; a zero or negative fps would divide by zero
/// and is rejected by [`crate::config::AnalysisConfig::validate`].
pub fn format_timestamp(frame_index: u64, fps: f64) -> String {
    let total_secs = (frame_index as f64 / fps) as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_zero_frame() {
        assert_eq!(format_timestamp(0, 24.0), "0:00");
    }

    #[test]
    fn timestamp_pads_seconds() {
        // 120 frames at 24 fps = 5 seconds.
        assert_eq!(format_timestamp(120, 24.0), "0:05");
    }

    #[test]
    fn timestamp_rolls_into_minutes() {
        // 24 fps * 61 seconds.
        assert_eq!(format_timestamp(24 * 61, 24.0), "1:01");
    }

    #[test]
    fn foot_position_is_bottom_center() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 60.0);
        let foot = bbox.foot_position();
        assert_eq!(foot.x, 20.0);
        assert_eq!(foot.y, 60.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
    }

    #[test]
    fn team_serializes_to_wire_labels() {
        assert_eq!(serde_json::to_value(Team::A).unwrap(), "team_a");
        assert_eq!(serde_json::to_value(Team::B).unwrap(), "team_b");
    }

    #[test]
    fn opponent_flips_sides() {
        assert_eq!(Team::A.opponent(), Team::B);
        assert_eq!(Team::B.opponent(), Team::A);
    }
}
