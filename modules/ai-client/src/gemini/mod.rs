mod client;
pub mod types;

use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::Engine;

use client::GeminiClient;
use types::{Content, GenerateContentRequest};

/// Default bound on one generateContent round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    model: String,
    base_url: Option<String>,
    timeout: Duration,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        let response = tokio::time::timeout(self.timeout, self.client().generate(&self.model, request))
            .await
            .map_err(|_| anyhow!("Gemini request timed out after {:?}", self.timeout))??;

        response
            .text()
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("No text in Gemini response"))
    }

    // =========================================================================
    // Convenience methods
    // =========================================================================

    /// Send inlined media bytes to Gemini vision with a task prompt and return
    /// the raw text of the first candidate.
    pub async fn describe_media(
        &self,
        bytes: &[u8],
        mime_type: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let request = GenerateContentRequest::new()
            .system(system)
            .content(Content::new().inline_data(mime_type, encoded).text(prompt));

        self.generate(&request).await
    }

    /// Send an instruction plus free text (two text parts) and return the raw
    /// text of the first candidate.
    pub async fn review_text(
        &self,
        instruction: &str,
        text: &str,
        system: &str,
    ) -> Result<String> {
        let request = GenerateContentRequest::new()
            .system(system)
            .content(Content::new().text(instruction).text(text));

        self.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("test-key", "gemini-2.0-flash");
        assert_eq!(ai.model(), "gemini-2.0-flash");
        assert_eq!(ai.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("test-key", "gemini-2.0-flash")
            .with_base_url("http://localhost:9999");
        assert_eq!(ai.base_url, Some("http://localhost:9999".to_string()));
    }
}
