//! Error type for the analysis pipeline stages.

/// Errors raised by pipeline collaborators other than transfer and
/// narration (those have their own handling: transfer errors are a
/// separate job outcome, narration errors never escape).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading or writing a local staging file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tracked-frames payload could not be decoded.
    #[error("Failed to decode tracked frames: {0}")]
    Decode(#[from] serde_json::Error),

    /// The tracking engine failed to produce frames.
    #[error("Tracking failed: {0}")]
    Tracking(String),

    /// The renderer failed to produce the output artifact.
    #[error("Rendering failed: {0}")]
    Render(String),
}
