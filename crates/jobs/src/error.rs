//! Failure taxonomy for job execution.
//!
//! Narration failures never appear here: they are absorbed with
//! fallback text wherever the narrator is called. Cancellation is a
//! terminal outcome, not an error.

use uuid::Uuid;

use matchlens_pipeline::media::TransferError;
use matchlens_pipeline::PipelineError;

/// A fatal failure while executing one job. The display string is
/// recorded verbatim as the job's error message.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Moving the source or output object failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Tracking, decoding or rendering failed inside the analysis.
    #[error(transparent)]
    Analysis(#[from] PipelineError),

    /// The registry has no record for this job id.
    #[error("Unknown job {0}")]
    UnknownJob(Uuid),
}
