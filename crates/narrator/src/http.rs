//! HTTP implementation of [`Narrator`] using [`reqwest`].
//!
//! Targets the retrieval-augmented generation service's REST surface:
//! `POST {base_url}/generate` with `{ "prompt": ... }`, returning
//! `{ "text": ... }`.

use serde::Deserialize;

use crate::Narrator;

/// Errors from the narration service layer.
#[derive(Debug, thiserror::Error)]
pub enum NarratorError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Narrator API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Response body of the `/generate` endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// HTTP client for one narration service instance.
pub struct HttpNarrator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNarrator {
    /// Create a client for the service at `base_url`
    /// (e.g. `http://host:8100`).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Narrator for HttpNarrator {
    async fn narrate(&self, prompt: &str) -> Result<String, NarratorError> {
        let body = serde_json::json!({ "prompt": prompt });

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NarratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<GenerateResponse>().await?;
        Ok(parsed.text)
    }
}
