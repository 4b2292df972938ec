use serde::{Deserialize, Serialize};

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

impl GenerateContentRequest {
    pub fn new() -> Self {
        Self {
            contents: Vec::new(),
            system_instruction: None,
        }
    }

    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(SystemInstruction {
            parts: TextPart { text: text.into() },
        });
        self
    }

    pub fn content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }
}

impl Default for GenerateContentRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text { text: text.into() });
        self
    }

    pub fn inline_data(mut self, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

/// The wire format nests a single text part object, not an array.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInstruction {
    pub parts: TextPart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: String,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}
