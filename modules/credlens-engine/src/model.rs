use anyhow::Result;
use async_trait::async_trait;

use ai_client::Gemini;
use credlens_common::{config::DEFAULT_MODEL, MediaPayload};

/// Vision/text model behind the pipeline. Takes the credential per call so a
/// key changed in settings applies to the very next analysis.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn analyze_media(
        &self,
        api_key: &str,
        payload: &MediaPayload,
        prompt: &str,
        system: &str,
    ) -> Result<String>;

    async fn analyze_text(
        &self,
        api_key: &str,
        instruction: &str,
        text: &str,
        system: &str,
    ) -> Result<String>;
}

/// Gemini-backed model.
pub struct GeminiVision {
    model: String,
    base_url: Option<String>,
}

impl Default for GeminiVision {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
        }
    }
}

impl GeminiVision {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    fn agent(&self, api_key: &str) -> Gemini {
        let agent = Gemini::new(api_key, &self.model);
        if let Some(ref url) = self.base_url {
            agent.with_base_url(url)
        } else {
            agent
        }
    }
}

#[async_trait]
impl VisionModel for GeminiVision {
    async fn analyze_media(
        &self,
        api_key: &str,
        payload: &MediaPayload,
        prompt: &str,
        system: &str,
    ) -> Result<String> {
        self.agent(api_key)
            .describe_media(&payload.bytes, &payload.mime_type, prompt, system)
            .await
    }

    async fn analyze_text(
        &self,
        api_key: &str,
        instruction: &str,
        text: &str,
        system: &str,
    ) -> Result<String> {
        self.agent(api_key)
            .review_text(instruction, text, system)
            .await
    }
}
