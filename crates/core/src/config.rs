//! Analysis tuning parameters.
//!
//! Defaults mirror the values the detection heuristics were calibrated
//! with; override per deployment before starting a job.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::track::Point;

/// Rectangular region of the pitch counted as the goal mouth.
///
/// Containment is strict on both axes: a ball exactly on the boundary is
/// *not* inside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GoalRegion {
    pub min: Point,
    pub max: Point,
}

impl GoalRegion {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Strict containment test on both axes.
    pub fn contains(&self, p: Point) -> bool {
        self.min.x < p.x && p.x < self.max.x && self.min.y < p.y && p.y < self.max.y
    }
}

/// All knobs for a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Source video frame rate, used to derive match-clock timestamps.
    pub fps: f64,
    /// A possessing player moving faster than this is narrated as dribbling.
    pub dribble_speed_threshold: f64,
    /// Ball speed strictly above this registers a shot.
    pub shot_speed_threshold: f64,
    /// Goal mouth rectangle for goal detection.
    pub goal_region: GoalRegion,
    /// Commentary is requested on frames where `frame_index % sampling_interval == 0`.
    pub sampling_interval: u64,
    /// Maximum number of recent events included in a commentary snapshot.
    pub recent_event_limit: usize,
    /// Rolling window length (frames) for possession context in commentary.
    pub possession_window: usize,
    /// Maximum foot-to-ball distance for a player to claim possession.
    pub max_player_ball_distance: f64,
    /// Progress percentage reported when the frame loop starts.
    pub frame_loop_progress_start: u8,
    /// Progress percentage reported when the frame loop finishes.
    pub frame_loop_progress_end: u8,
    /// Progress is written to the job record every this many frames to
    /// bound write contention with polling readers.
    pub progress_stride: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            dribble_speed_threshold: 1.5,
            shot_speed_threshold: 8.0,
            goal_region: GoalRegion::new(Point::new(100.0, 50.0), Point::new(200.0, 100.0)),
            sampling_interval: 30,
            recent_event_limit: 5,
            possession_window: 150,
            max_player_ball_distance: 70.0,
            frame_loop_progress_start: 30,
            frame_loop_progress_end: 90,
            progress_stride: 10,
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations that would make the frame loop misbehave.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fps <= 0.0 {
            return Err(CoreError::Validation("fps must be positive".to_string()));
        }
        if self.sampling_interval == 0 {
            return Err(CoreError::Validation(
                "sampling_interval must be at least 1".to_string(),
            ));
        }
        if self.possession_window == 0 {
            return Err(CoreError::Validation(
                "possession_window must be at least 1".to_string(),
            ));
        }
        if self.progress_stride == 0 {
            return Err(CoreError::Validation(
                "progress_stride must be at least 1".to_string(),
            ));
        }
        if self.goal_region.min.x >= self.goal_region.max.x
            || self.goal_region.min.y >= self.goal_region.max.y
        {
            return Err(CoreError::Validation(
                "goal_region min corner must be strictly below max corner on both axes"
                    .to_string(),
            ));
        }
        if self.frame_loop_progress_start > self.frame_loop_progress_end
            || self.frame_loop_progress_end > 100
        {
            return Err(CoreError::Validation(
                "frame loop progress range must be ordered and within 0..=100".to_string(),
            ));
        }
        Ok(())
    }
}
