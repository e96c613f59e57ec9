//! Job orchestration: the state machine, the shared registry, and the
//! background worker that runs one analysis end to end.
//!
//! Job state lives in memory for the lifetime of the process; there is
//! no persistence across restarts. One worker exists per job id, and
//! the registry is the only shared mutable state -- it is injected into
//! both the HTTP handlers and the workers rather than living in a
//! global.

pub mod coaching;
pub mod error;
pub mod record;
pub mod registry;
pub mod status;
pub mod worker;

pub use error::JobError;
pub use record::{AnalysisResult, JobRecord};
pub use registry::JobRegistry;
pub use status::JobStatus;
pub use worker::{spawn, WorkerContext};
