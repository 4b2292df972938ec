//! Mock collaborators for tests. Compiled only with the `test-support`
//! feature.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use credlens_common::MediaPayload;

use crate::fetch::MediaFetcher;
use crate::model::VisionModel;

/// Fetcher that always fails, forcing the placeholder path.
pub struct FailingFetcher;

#[async_trait]
impl MediaFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<MediaPayload> {
        Err(anyhow!("fetch refused: {url}"))
    }
}

/// Fetcher that returns fixed bytes.
pub struct StaticFetcher {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl StaticFetcher {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/png".to_string(),
        }
    }
}

#[async_trait]
impl MediaFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<MediaPayload> {
        Ok(MediaPayload {
            bytes: self.bytes.clone(),
            mime_type: self.mime_type.clone(),
        })
    }
}

/// Model that always errors, forcing the mock-analysis path.
pub struct FailingModel;

#[async_trait]
impl VisionModel for FailingModel {
    async fn analyze_media(
        &self,
        _api_key: &str,
        _payload: &MediaPayload,
        _prompt: &str,
        _system: &str,
    ) -> Result<String> {
        Err(anyhow!("model unavailable"))
    }

    async fn analyze_text(
        &self,
        _api_key: &str,
        _instruction: &str,
        _text: &str,
        _system: &str,
    ) -> Result<String> {
        Err(anyhow!("model unavailable"))
    }
}

/// Model that returns a fixed response and counts invocations.
pub struct ScriptedModel {
    response: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn analyze_media(
        &self,
        _api_key: &str,
        _payload: &MediaPayload,
        _prompt: &str,
        _system: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    async fn analyze_text(
        &self,
        _api_key: &str,
        _instruction: &str,
        _text: &str,
        _system: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
