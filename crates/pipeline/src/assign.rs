//! Possession assignment: which player, if any, controls the ball.

use std::collections::BTreeMap;

use matchlens_core::track::{BallTrack, PlayerId, PlayerTrack};

/// Capability interface for the possession-assignment collaborator.
pub trait PossessionAssigner: Send + Sync {
    /// Resolve the player controlling the ball this frame, or `None`
    /// when the ball is unclaimed.
    fn assign(
        &self,
        players: &BTreeMap<PlayerId, PlayerTrack>,
        ball: &BallTrack,
    ) -> Option<PlayerId>;
}

/// Default assigner: the player whose feet are closest to the ball
/// center claims possession, provided the distance is within a maximum.
///
/// Ties go to the lowest player id (player iteration is ordered).
pub struct NearestPlayerAssigner {
    max_distance: f64,
}

impl NearestPlayerAssigner {
    pub fn new(max_distance: f64) -> Self {
        Self { max_distance }
    }
}

impl PossessionAssigner for NearestPlayerAssigner {
    fn assign(
        &self,
        players: &BTreeMap<PlayerId, PlayerTrack>,
        ball: &BallTrack,
    ) -> Option<PlayerId> {
        let ball_center = ball.bbox.center();
        let mut best: Option<(PlayerId, f64)> = None;

        for (&id, track) in players {
            let distance = track.bbox.foot_position().distance_to(ball_center);
            if distance > self.max_distance {
                continue;
            }
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((id, distance)),
            }
        }

        best.map(|(id, _)| id)
    }
}
