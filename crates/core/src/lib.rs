//! Pure domain logic for football match analysis.
//!
//! Everything in this crate is deterministic and synchronous: frame and
//! track types, the per-frame event detector, possession aggregation,
//! commentary snapshot building, and coaching report requests. External
//! collaborators (tracking, narration, rendering, transfer) live behind
//! traits in `matchlens-pipeline`; this crate has zero internal
//! dependencies so it can be tested without any of them.

pub mod coaching;
pub mod commentary;
pub mod config;
pub mod detector;
pub mod error;
pub mod possession;
pub mod track;

pub use error::CoreError;
