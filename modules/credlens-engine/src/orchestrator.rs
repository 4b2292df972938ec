//! Pipeline entry point. One orchestrator instance serves the whole session;
//! per-operation state lives in locals. The pipeline degrades instead of
//! failing: only a missing credential surfaces as an error to the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use credlens_common::{
    settings_keys, AnalysisResult, CredLensError, MediaDescriptor, MediaPayload, MediaType,
};

use crate::crossref::ClaimCrossReferencer;
use crate::fetch::{HttpMediaFetcher, MediaFetcher};
use crate::model::{GeminiVision, VisionModel};
use crate::parser::{self, ModelAnalysis};
use crate::score;
use crate::settings::{Settings, SettingsStore};
use crate::sources::SourceRegistry;

const MEDIA_SYSTEM_PROMPT: &str = "You are a forensic media analyst specializing in deepfake and \
manipulation detection. Examine the provided media for signs of synthetic generation, splicing, \
or digital tampering. Respond with a JSON object containing: \"assessment\" (a concise written \
evaluation), \"artifacts\" (array of visual anomalies found), \"inconsistencies\" (array of \
contextual mismatches such as lighting or anatomy), \"confidence\" (0-100), and \"claims\" \
(array of factual claims depicted in the media).";

const IMAGE_PROMPT: &str = "Analyze this image for evidence of manipulation or synthetic \
generation. Look for compression artifacts, warped geometry, lighting mismatches, and unnatural \
textures.";

const VIDEO_PROMPT: &str = "Analyze this video frame for evidence of deepfake manipulation. Look \
for face blending boundaries, temporal artifacts, lighting mismatches, and unnatural motion \
blur.";

const TEXT_SYSTEM_PROMPT: &str = "You are a fact-checker. Assess the credibility of the provided \
text. Respond with a JSON object containing: \"assessment\" (a concise written evaluation), \
\"artifacts\" (array of misleading framing techniques found), \"inconsistencies\" (array of \
internal contradictions), \"confidence\" (0-100), and \"claims\" (array of verifiable factual \
claims extracted from the text).";

const TEXT_INSTRUCTION: &str = "Evaluate the credibility of the following text:";

/// Runs the full credibility pipeline: fetch, model analysis, parsing,
/// cross-referencing, scoring.
pub struct AnalysisOrchestrator {
    settings: Arc<dyn SettingsStore>,
    fetcher: Arc<dyn MediaFetcher>,
    model: Arc<dyn VisionModel>,
    crossref: ClaimCrossReferencer,
}

impl AnalysisOrchestrator {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            fetcher: Arc::new(HttpMediaFetcher),
            model: Arc::new(GeminiVision::default()),
            crossref: ClaimCrossReferencer::new(SourceRegistry::default()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn MediaFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.model = model;
        self
    }

    pub fn with_crossref(mut self, crossref: ClaimCrossReferencer) -> Self {
        self.crossref = crossref;
        self
    }

    /// Analyze one piece of page media. Fetch and model failures degrade to
    /// placeholder input and the mock analysis; only a missing API key fails.
    pub async fn analyze_media(
        &self,
        media: &MediaDescriptor,
    ) -> Result<AnalysisResult, CredLensError> {
        let api_key = self.api_key().await?;
        let settings = Settings::load(self.settings.as_ref()).await?;

        let payload = match self.fetcher.fetch(&media.src).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(src = media.src.as_str(), error = %e, "Media fetch failed, using placeholder");
                MediaPayload::placeholder()
            }
        };

        let prompt = match media.media_type {
            MediaType::Image => IMAGE_PROMPT,
            MediaType::Video => VIDEO_PROMPT,
        };

        let analysis = match self
            .model
            .analyze_media(&api_key, &payload, prompt, MEDIA_SYSTEM_PROMPT)
            .await
        {
            Ok(raw) => parser::parse(&raw),
            Err(e) => {
                warn!(src = media.src.as_str(), error = %e, "Model call failed, using mock analysis");
                parser::mock_analysis()
            }
        };

        let result = self
            .finish(Some(media.media_type), analysis, &settings)
            .await;
        info!(
            src = media.src.as_str(),
            score = result.credibility_score,
            "Media analysis complete"
        );
        Ok(result)
    }

    /// Analyze a user text selection. Same degradation rules as media, minus
    /// the byte fetch.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, CredLensError> {
        let api_key = self.api_key().await?;
        let settings = Settings::load(self.settings.as_ref()).await?;

        let analysis = match self
            .model
            .analyze_text(&api_key, TEXT_INSTRUCTION, text, TEXT_SYSTEM_PROMPT)
            .await
        {
            Ok(raw) => parser::parse(&raw),
            Err(e) => {
                warn!(error = %e, "Model call failed, using mock analysis");
                parser::mock_analysis()
            }
        };

        let result = self.finish(None, analysis, &settings).await;
        info!(score = result.credibility_score, "Text analysis complete");
        Ok(result)
    }

    /// Analyze a batch concurrently. Results come back in input order; each
    /// item carries its own outcome.
    pub async fn analyze_bulk(
        &self,
        media: &[MediaDescriptor],
    ) -> Vec<Result<AnalysisResult, CredLensError>> {
        let futures = media.iter().map(|m| self.analyze_media(m));
        futures::future::join_all(futures).await
    }

    async fn finish(
        &self,
        media_type: Option<MediaType>,
        analysis: ModelAnalysis,
        settings: &Settings,
    ) -> AnalysisResult {
        let db_results = if settings.database_check {
            self.crossref.cross_reference(&analysis.claims).await
        } else {
            Default::default()
        };

        let credibility_score = score::calculate(&analysis, &db_results);

        AnalysisResult {
            media_type,
            credibility_score,
            assessment: analysis.assessment,
            artifacts: analysis.artifacts,
            inconsistencies: analysis.inconsistencies,
            confidence: analysis.confidence,
            db_results,
            claims: analysis.claims,
            timestamp: Utc::now(),
        }
    }

    async fn api_key(&self) -> Result<String, CredLensError> {
        match self.settings.get(settings_keys::GEMINI_API_KEY).await? {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(CredLensError::Config("Gemini API key is not set".to_string())),
        }
    }
}
