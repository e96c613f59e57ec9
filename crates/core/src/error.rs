//! Domain-level error type shared across the workspace.

/// Errors produced by domain logic.
///
/// HTTP mapping happens in the api crate's `AppError`; this type stays
/// transport-agnostic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A value failed validation (bad configuration, bad request field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An entity was looked up by id and does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Job"`.
        entity: &'static str,
        /// The id that was requested.
        id: String,
    },

    /// The operation conflicts with the entity's current state
    /// (e.g. requesting a coaching report for an unfinished job).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
