//! Action-tagged request handling, the boundary the UI surfaces talk to.
//! Every request gets a response; pipeline errors come back as user-facing
//! messages, never as raw error chains.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use credlens_common::{AnalysisResult, CredLensError, MediaDescriptor};

use crate::orchestrator::AnalysisOrchestrator;

/// Bound on one end-to-end analysis, independent of inner HTTP timeouts.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
/// Most media items one bulk request may carry; extras are dropped.
pub const MAX_MEDIA_PER_REQUEST: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    AnalyzeMedia { media: MediaDescriptor },
    #[serde(rename_all = "camelCase")]
    BulkAnalyze { media_list: Vec<MediaDescriptor> },
    #[serde(rename_all = "camelCase")]
    AnalyzeText { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Response>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn ok(data: AnalysisResult) -> Self {
        Self {
            success: true,
            data: Some(data),
            results: None,
            error: None,
        }
    }

    fn bulk(results: Vec<Response>) -> Self {
        Self {
            success: true,
            data: None,
            results: Some(results),
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            results: None,
            error: Some(message.into()),
        }
    }
}

/// What the page should render in reaction to an analysis, addressed by
/// content rather than element handle since results cross a serialization
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DisplayDirective {
    #[serde(rename_all = "camelCase")]
    DisplayBadge {
        target_src: String,
        result: AnalysisResult,
    },
    #[serde(rename_all = "camelCase")]
    DisplayTextResult {
        selection_text: String,
        result: AnalysisResult,
    },
    ClearBadges,
    #[serde(rename_all = "camelCase")]
    DisplayError { error: String },
}

/// Stateless request dispatcher over the orchestrator.
pub struct AnalysisService {
    orchestrator: Arc<AnalysisOrchestrator>,
    timeout: Duration,
}

impl AnalysisService {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self {
            orchestrator,
            timeout: ANALYSIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::AnalyzeMedia { media } => {
                info!(src = media.src.as_str(), "Handling analyzeMedia");
                self.single(self.orchestrator.analyze_media(&media)).await
            }
            Request::BulkAnalyze { media_list } => {
                let total = media_list.len();
                let media_list: Vec<MediaDescriptor> = media_list
                    .into_iter()
                    .take(MAX_MEDIA_PER_REQUEST)
                    .collect();
                info!(total, accepted = media_list.len(), "Handling bulkAnalyze");

                let outcome = tokio::time::timeout(
                    self.timeout,
                    self.orchestrator.analyze_bulk(&media_list),
                )
                .await;
                match outcome {
                    Ok(results) => Response::bulk(
                        results.into_iter().map(|r| self.settle(r)).collect(),
                    ),
                    Err(_) => Response::failure("Analysis timed out. Please try again."),
                }
            }
            Request::AnalyzeText { text } => {
                info!(chars = text.len(), "Handling analyzeText");
                self.single(self.orchestrator.analyze_text(&text)).await
            }
        }
    }

    async fn single(
        &self,
        operation: impl std::future::Future<Output = Result<AnalysisResult, CredLensError>>,
    ) -> Response {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => self.settle(result),
            Err(_) => Response::failure("Analysis timed out. Please try again."),
        }
    }

    fn settle(&self, result: Result<AnalysisResult, CredLensError>) -> Response {
        match result {
            Ok(data) => Response::ok(data),
            Err(e) => {
                error!(error = %e, "Request failed");
                Response::failure(e.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MemoryStore, SettingsStore};
    use crate::testing::{FailingFetcher, ScriptedModel};

    fn service(store: Arc<MemoryStore>) -> AnalysisService {
        let orchestrator = AnalysisOrchestrator::new(store as Arc<dyn SettingsStore>)
            .with_fetcher(Arc::new(FailingFetcher))
            .with_model(Arc::new(ScriptedModel::new(
                r#"{"assessment":"ok","confidence":90}"#,
            )));
        AnalysisService::new(Arc::new(orchestrator))
    }

    #[test]
    fn requests_deserialize_from_action_tag() {
        let request: Request = serde_json::from_str(
            r#"{"action":"analyzeText","text":"hello"}"#,
        )
        .unwrap();
        assert!(matches!(request, Request::AnalyzeText { ref text } if text == "hello"));

        let request: Request = serde_json::from_str(
            r#"{"action":"bulkAnalyze","mediaList":[]}"#,
        )
        .unwrap();
        assert!(matches!(request, Request::BulkAnalyze { ref media_list } if media_list.is_empty()));
    }

    #[tokio::test]
    async fn analyze_media_round_trip() {
        let service = service(Arc::new(MemoryStore::with_api_key("test-key")));
        let response = service
            .handle(Request::AnalyzeMedia {
                media: MediaDescriptor::image("https://example.com/a.jpg", None),
            })
            .await;

        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.assessment, "ok");
    }

    #[tokio::test]
    async fn config_error_maps_to_user_message() {
        let service = service(Arc::new(MemoryStore::new()));
        let response = service
            .handle(Request::AnalyzeText {
                text: "claim".to_string(),
            })
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn bulk_caps_and_itemizes() {
        let service = service(Arc::new(MemoryStore::with_api_key("test-key")));
        let media_list: Vec<MediaDescriptor> = (0..MAX_MEDIA_PER_REQUEST + 10)
            .map(|i| MediaDescriptor::image(format!("https://example.com/{i}.jpg"), None))
            .collect();

        let response = service.handle(Request::BulkAnalyze { media_list }).await;
        assert!(response.success);
        let results = response.results.unwrap();
        assert_eq!(results.len(), MAX_MEDIA_PER_REQUEST);
        assert!(results.iter().all(|r| r.success));
    }

    #[test]
    fn directives_serialize_with_action_tag() {
        let directive = DisplayDirective::ClearBadges;
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["action"], "clearBadges");

        let directive = DisplayDirective::DisplayError {
            error: "nope".to_string(),
        };
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["action"], "displayError");
        assert_eq!(json["error"], "nope");
    }
}
