use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media a descriptor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// One piece of media discovered on a page. Identified by `(media_type, src)`.
/// Immutable once built; a fresh scan rebuilds descriptors from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescriptor {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Resolved absolute URL.
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Hosting platform label for embedded players (YouTube, Vimeo, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub discovered_at: DateTime<Utc>,
}

impl MediaDescriptor {
    pub fn image(src: impl Into<String>, alt: Option<String>) -> Self {
        Self {
            media_type: MediaType::Image,
            src: src.into(),
            alt,
            platform: None,
            discovered_at: Utc::now(),
        }
    }

    pub fn video(src: impl Into<String>, platform: Option<String>) -> Self {
        Self {
            media_type: MediaType::Video,
            src: src.into(),
            alt: None,
            platform,
            discovered_at: Utc::now(),
        }
    }
}

/// Raw media bytes fetched for analysis. Transient, owned by one pipeline run.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl MediaPayload {
    /// Empty placeholder substituted when the byte fetch fails. The pipeline
    /// proceeds with degraded input rather than blocking the user.
    pub fn placeholder() -> Self {
        Self {
            bytes: Vec::new(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of checking extracted claims against one trusted source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub status: CheckStatus,
    #[serde(default)]
    pub matched_claims: Vec<String>,
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn undetermined() -> Self {
        Self {
            status: CheckStatus::Checked,
            matched_claims: Vec::new(),
            verdict: Verdict::Undetermined,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            matched_claims: Vec::new(),
            verdict: Verdict::Undetermined,
            error: Some(message.into()),
        }
    }

    /// A source counts against the credibility score when the lookup itself
    /// failed or the source disputed the claim.
    pub fn counts_against_score(&self) -> bool {
        self.status == CheckStatus::Error || self.verdict == Verdict::False
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Checked,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    False,
    #[default]
    Undetermined,
}

/// Terminal artifact of one analysis pipeline run. Immutable once produced;
/// crosses the messaging boundary and drives badge rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// `None` for text-selection analyses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Estimated authenticity in [0,1]; higher = more likely authentic.
    pub credibility_score: f32,
    pub assessment: String,
    pub artifacts: Vec<String>,
    pub inconsistencies: Vec<String>,
    /// Model self-reported confidence, 0-100.
    pub confidence: u8,
    pub db_results: BTreeMap<String, CheckOutcome>,
    pub claims: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Score as a whole percentage for badge display.
    pub fn score_percent(&self) -> u8 {
        (self.credibility_score.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
