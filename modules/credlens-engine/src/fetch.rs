use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use credlens_common::MediaPayload;

/// Fetches raw media bytes for analysis. The orchestrator treats fetch
/// failures as degradation, never as pipeline failure.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<MediaPayload>;
}

/// Plain HTTP fetcher.
pub struct HttpMediaFetcher;

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<MediaPayload> {
        let client = reqwest::Client::new();
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Media fetch failed ({}): {}", response.status(), url));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| "image/jpeg".to_string());

        let bytes = response.bytes().await?.to_vec();
        debug!(url, bytes = bytes.len(), mime_type, "Fetched media");

        Ok(MediaPayload { bytes, mime_type })
    }
}
