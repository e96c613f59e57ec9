//! Per-job analysis pipeline.
//!
//! Wires the pure detection logic from `matchlens-core` to the external
//! collaborators, each behind a capability trait with a single required
//! operation so tests can substitute deterministic implementations:
//!
//! - [`assign::PossessionAssigner`] -- which player controls the ball;
//! - [`engine::TrackingEngine`] -- source media to tracked frames;
//! - [`engine::Renderer`] -- annotated output artifact;
//! - [`media::MediaStore`] -- blob transfer in and out.
//!
//! [`analyzer::analyze_frames`] is the frame loop itself: detection,
//! possession aggregation, commentary sampling, live-buffer updates and
//! progress reporting in a single pass.

pub mod analyzer;
pub mod assign;
pub mod engine;
pub mod error;
pub mod media;
pub mod progress;

pub use analyzer::{analyze_frames, MatchAnalysis};
pub use error::PipelineError;
