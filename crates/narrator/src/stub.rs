//! Deterministic [`Narrator`] implementations for tests and local runs.

use crate::http::NarratorError;
use crate::Narrator;

/// Narrator returning the same line for every prompt.
pub struct StaticNarrator {
    line: String,
}

impl StaticNarrator {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }
}

#[async_trait::async_trait]
impl Narrator for StaticNarrator {
    async fn narrate(&self, _prompt: &str) -> Result<String, NarratorError> {
        Ok(self.line.clone())
    }
}

/// Narrator that fails every call. Exercises the fallback paths.
pub struct FailingNarrator;

#[async_trait::async_trait]
impl Narrator for FailingNarrator {
    async fn narrate(&self, _prompt: &str) -> Result<String, NarratorError> {
        Err(NarratorError::Api {
            status: 503,
            body: "narration service unavailable".to_string(),
        })
    }
}
