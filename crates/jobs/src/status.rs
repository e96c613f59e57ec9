//! Job lifecycle state machine.
//!
//! ```text
//! queued → downloading → analyzing → uploading → done
//!    \___________\____________\__________\→ error | cancelled
//! ```
//!
//! `done`, `error` and `cancelled` are terminal. Transitions only move
//! forward along the graph; a terminal status is never overwritten.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Downloading,
    Analyzing,
    Uploading,
    Done,
    Error,
    Cancelled,
}

impl JobStatus {
    /// Whether no further transition is possible from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error | JobStatus::Cancelled)
    }

    /// Position along the success path; terminal failure states sit
    /// outside the ordering.
    fn rank(self) -> Option<u8> {
        match self {
            JobStatus::Queued => Some(0),
            JobStatus::Downloading => Some(1),
            JobStatus::Analyzing => Some(2),
            JobStatus::Uploading => Some(3),
            JobStatus::Done => Some(4),
            JobStatus::Error | JobStatus::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    ///
    /// Forward moves along the success path are allowed (including
    /// skips); `error` and `cancelled` are reachable from any
    /// non-terminal state; nothing leaves a terminal state.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            // Unreachable: every non-terminal status has a rank.
            (None, Some(_)) => false,
        }
    }

    /// Wire label, e.g. `"downloading"`.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Analyzing => "analyzing",
            JobStatus::Uploading => "uploading",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
