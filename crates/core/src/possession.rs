//! Possession aggregation over the full frame sequence.
//!
//! [`PossessionLedger`] records one label per frame (after the
//! detector's carry-over has been applied) and answers two questions:
//! the final match possession split, and a rolling-window split used as
//! commentary context.

use serde::{Deserialize, Serialize};

use crate::track::Team;

/// Final possession percentages for the match.
///
/// Percentages are computed against classified (non-none) frames only
/// and rounded to one decimal. A match where the ball was never claimed
/// reports a neutral 50/50 split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PossessionTotals {
    pub team_a_pct: f64,
    pub team_b_pct: f64,
}

impl PossessionTotals {
    /// Neutral split used when no frame was ever classified.
    pub const NEUTRAL: PossessionTotals = PossessionTotals {
        team_a_pct: 50.0,
        team_b_pct: 50.0,
    };

    /// Human-readable summary, e.g. `"team_a 61.5% - team_b 38.5%"`.
    pub fn describe(&self) -> String {
        format!(
            "team_a {:.1}% - team_b {:.1}%",
            self.team_a_pct, self.team_b_pct
        )
    }
}

/// Possession counts over a trailing window of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    pub team_a: usize,
    pub team_b: usize,
}

impl WindowStats {
    /// Number of classified samples in the window.
    pub fn classified(&self) -> usize {
        self.team_a + self.team_b
    }

    fn pct(count: usize, classified: usize) -> f64 {
        round1(count as f64 / classified as f64 * 100.0)
    }

    /// Window possession summary against the window's classified count,
    /// or a neutral placeholder when nothing in the window is classified.
    pub fn describe(&self) -> String {
        let classified = self.classified();
        if classified == 0 {
            return "possession evenly contested".to_string();
        }
        format!(
            "team_a {:.1}% - team_b {:.1}%",
            Self::pct(self.team_a, classified),
            Self::pct(self.team_b, classified)
        )
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Append-only record of per-frame possession labels.
#[derive(Debug, Default)]
pub struct PossessionLedger {
    samples: Vec<Option<Team>>,
}

impl PossessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the possession label for the next frame.
    pub fn record(&mut self, label: Option<Team>) {
        self.samples.push(label);
    }

    /// Number of frames recorded so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples recorded so far, one per frame.
    pub fn samples(&self) -> &[Option<Team>] {
        &self.samples
    }

    /// Final possession split over all classified frames.
    pub fn totals(&self) -> PossessionTotals {
        let team_a = self.samples.iter().filter(|s| **s == Some(Team::A)).count();
        let team_b = self.samples.iter().filter(|s| **s == Some(Team::B)).count();
        let classified = team_a + team_b;
        if classified == 0 {
            return PossessionTotals::NEUTRAL;
        }
        PossessionTotals {
            team_a_pct: round1(team_a as f64 / classified as f64 * 100.0),
            team_b_pct: round1(team_b as f64 / classified as f64 * 100.0),
        }
    }

    /// Counts over the last `len` samples (fewer if the match is shorter).
    pub fn window(&self, len: usize) -> WindowStats {
        let start = self.samples.len().saturating_sub(len);
        let mut stats = WindowStats { team_a: 0, team_b: 0 };
        for sample in &self.samples[start..] {
            match sample {
                Some(Team::A) => stats.team_a += 1,
                Some(Team::B) => stats.team_b += 1,
                None => {}
            }
        }
        stats
    }
}
