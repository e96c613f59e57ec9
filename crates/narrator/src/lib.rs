//! Client for the external narration service.
//!
//! The narrator turns a context prompt into prose (live commentary or a
//! coaching report). It is the most expensive and least reliable
//! collaborator in the system, so its contract is deliberately small:
//! one operation, and every caller must tolerate failure. Use
//! [`narrate_with_fallback`] anywhere a failure should degrade to fixed
//! text instead of surfacing.

pub mod http;
pub mod stub;

pub use http::{HttpNarrator, NarratorError};
pub use stub::{FailingNarrator, StaticNarrator};

/// Text substituted when a live-commentary narration call fails.
pub const COMMENTARY_FALLBACK: &str = "Commentary is temporarily unavailable.";

/// Text substituted when a coaching-report narration call fails.
pub const COACHING_FALLBACK: &str = "A coaching report could not be generated for this match.";

/// Capability interface for the narration service.
///
/// Implementations must be safe to call concurrently; the orchestrator
/// shares one narrator across all running jobs.
#[async_trait::async_trait]
pub trait Narrator: Send + Sync {
    /// Turn a context prompt into prose. May fail; callers decide
    /// whether failure is fatal (it never is, in this system).
    async fn narrate(&self, prompt: &str) -> Result<String, NarratorError>;
}

/// Call the narrator and absorb any failure into `fallback`.
///
/// Failures are logged at `warn` and never propagate; the caller gets
/// the fallback text instead.
pub async fn narrate_with_fallback(
    narrator: &dyn Narrator,
    prompt: &str,
    fallback: &str,
) -> String {
    match narrator.narrate(prompt).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "Narration failed, substituting fallback text");
            fallback.to_string()
        }
    }
}
