//! Coaching report request building.
//!
//! A coaching report is derived entirely from the durable aggregates of
//! a completed analysis (event descriptions, commentary, possession
//! totals), so a new report -- including one favouring a particular side
//! -- can be requested at any time without re-running frame analysis.

use serde::{Deserialize, Serialize};

use crate::possession::PossessionTotals;
use crate::track::Team;

/// Inputs for one coaching report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingRequest {
    pub possession: PossessionTotals,
    /// All sampled commentary lines, in match order.
    pub commentary: Vec<String>,
    /// All durable event descriptions, in match order.
    pub event_descriptions: Vec<String>,
    /// When set, the report is written from this side's perspective.
    pub perspective: Option<Team>,
}

impl CoachingRequest {
    /// Serialize the request into the narrator prompt.
    pub fn prompt(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "Write a post-match coaching report based on the following analysis.\n\n",
        );
        prompt.push_str(&format!("Possession: {}.\n\n", self.possession.describe()));

        prompt.push_str("Match events:\n");
        if self.event_descriptions.is_empty() {
            prompt.push_str("(no notable events were detected)\n");
        } else {
            for description in &self.event_descriptions {
                prompt.push_str(&format!("- {description}\n"));
            }
        }

        prompt.push_str("\nLive commentary:\n");
        if self.commentary.is_empty() {
            prompt.push_str("(no commentary was recorded)\n");
        } else {
            for line in &self.commentary {
                prompt.push_str(&format!("- {line}\n"));
            }
        }

        if let Some(team) = self.perspective {
            prompt.push_str(&format!(
                "\nWrite the report from the perspective of {}, focusing on what \
                 that side should work on.\n",
                team.label()
            ));
        }

        prompt
    }
}
