//! Glue between the page surrogate and the analysis pipeline: scan the
//! document, analyze what is new, render badges, expire panels.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use credlens_common::{CredLensError, MediaDescriptor};
use credlens_page::{scan, Document, ElementId, OverlayManager};

use crate::orchestrator::AnalysisOrchestrator;
use crate::scanner::ScanTarget;
use crate::settings::{Settings, SettingsStore};

/// Upper bound on badges present on one page at a time.
pub const OVERLAY_CAP: usize = 50;

struct PageState {
    doc: Document,
    overlay: OverlayManager,
    /// Source URLs already sent through the pipeline this session. A fresh
    /// scan may rediscover them; they are not analyzed twice.
    processed: HashSet<String>,
}

/// Watches one document. All page state sits behind a single lock; the lock
/// is never held across an analysis await.
pub struct PageMonitor {
    settings: Arc<dyn SettingsStore>,
    orchestrator: Arc<AnalysisOrchestrator>,
    state: Mutex<PageState>,
}

impl PageMonitor {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        orchestrator: Arc<AnalysisOrchestrator>,
        doc: Document,
    ) -> Self {
        Self {
            settings,
            orchestrator,
            state: Mutex::new(PageState {
                doc,
                overlay: OverlayManager::new(),
                processed: HashSet::new(),
            }),
        }
    }

    /// Scan the document and analyze up to `batch_limit` unprocessed media
    /// items, badging each analyzed element. Returns how many were analyzed.
    pub async fn scan_and_analyze(&self, batch_limit: usize) -> Result<usize, CredLensError> {
        let batch: Vec<(MediaDescriptor, Vec<ElementId>)> = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.overlay.expire_panels(&mut state.doc, Utc::now());

            let budget = batch_limit.min(OVERLAY_CAP.saturating_sub(state.overlay.badge_count()));
            let catalog = scan(&state.doc);
            let mut batch = Vec::new();
            for media in &catalog.media {
                if batch.len() >= budget {
                    break;
                }
                if state.processed.contains(&media.src) {
                    continue;
                }
                // Claimed up front so an overlapping cycle skips it.
                state.processed.insert(media.src.clone());
                let elements = catalog.elements_for(&media.src).to_vec();
                batch.push((media.clone(), elements));
            }
            batch
        };

        if batch.is_empty() {
            debug!("No new media to analyze");
            return Ok(0);
        }

        let descriptors: Vec<MediaDescriptor> = batch.iter().map(|(m, _)| m.clone()).collect();
        let results = self.orchestrator.analyze_bulk(&descriptors).await;

        let mut analyzed = 0;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        for (i, ((media, elements), result)) in batch.into_iter().zip(results).enumerate() {
            match result {
                Ok(result) => {
                    for element in elements {
                        state.overlay.place_badge(&mut state.doc, element, &result);
                    }
                    analyzed += 1;
                }
                Err(e @ CredLensError::Config(_)) => {
                    // Unclaim this item and everything after it so the whole
                    // batch retries once a key exists.
                    for pending in &descriptors[i..] {
                        state.processed.remove(&pending.src);
                    }
                    return Err(e);
                }
                Err(e) => {
                    error!(src = media.src.as_str(), error = %e, "Analysis failed");
                    state.processed.remove(&media.src);
                }
            }
        }

        info!(analyzed, badges = state.overlay.badge_count(), "Scan cycle complete");
        Ok(analyzed)
    }

    /// Open the detail panel for a badged element.
    pub async fn badge_clicked(&self, element: ElementId) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.overlay.badge_clicked(&mut state.doc, element);
    }

    /// Remove every badge and panel and forget analysis history, so a later
    /// scan starts from scratch.
    pub async fn clear(&self) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.overlay.clear_all(&mut state.doc);
        state.processed.clear();
    }

    pub async fn badge_count(&self) -> usize {
        self.state.lock().await.overlay.badge_count()
    }

    /// Mutate the underlying document, e.g. to mirror page changes.
    pub async fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state.doc)
    }
}

#[async_trait::async_trait]
impl ScanTarget for PageMonitor {
    async fn run_cycle(&self, batch_limit: usize) {
        let auto_analyze = match Settings::load(self.settings.as_ref()).await {
            Ok(settings) => settings.auto_analyze,
            Err(e) => {
                error!(error = %e, "Failed to load settings, skipping cycle");
                return;
            }
        };
        if !auto_analyze {
            debug!("Auto-analyze disabled, skipping cycle");
            return;
        }

        if let Err(e) = self.scan_and_analyze(batch_limit).await {
            error!(error = %e, "Scan cycle aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;
    use crate::testing::{FailingFetcher, ScriptedModel};
    use credlens_common::settings_keys;
    use credlens_page::{Element, Rect};

    fn doc_with_images(n: usize) -> Document {
        let mut doc = Document::new("https://example.com");
        for i in 0..n {
            doc.append(
                None,
                Element::new("img")
                    .attr("src", &format!("/img-{i}.png"))
                    .rect(Rect::new(100.0, 100.0, 0.0)),
            );
        }
        doc
    }

    fn monitor_with(store: Arc<MemoryStore>, doc: Document) -> PageMonitor {
        let orchestrator = AnalysisOrchestrator::new(store.clone() as Arc<dyn SettingsStore>)
            .with_fetcher(Arc::new(FailingFetcher))
            .with_model(Arc::new(ScriptedModel::new(
                r#"{"assessment":"ok","confidence":90}"#,
            )));
        PageMonitor::new(store, Arc::new(orchestrator), doc)
    }

    #[tokio::test]
    async fn analyzes_and_badges_discovered_media() {
        let store = Arc::new(MemoryStore::with_api_key("test-key"));
        let monitor = monitor_with(store, doc_with_images(3));

        let analyzed = monitor.scan_and_analyze(10).await.unwrap();
        assert_eq!(analyzed, 3);
        assert_eq!(monitor.badge_count().await, 3);
    }

    #[tokio::test]
    async fn batch_limit_spreads_work_across_cycles() {
        let store = Arc::new(MemoryStore::with_api_key("test-key"));
        let monitor = monitor_with(store, doc_with_images(5));

        assert_eq!(monitor.scan_and_analyze(2).await.unwrap(), 2);
        assert_eq!(monitor.scan_and_analyze(2).await.unwrap(), 2);
        assert_eq!(monitor.scan_and_analyze(2).await.unwrap(), 1);
        assert_eq!(monitor.scan_and_analyze(2).await.unwrap(), 0);
        assert_eq!(monitor.badge_count().await, 5);
    }

    #[tokio::test]
    async fn missing_key_aborts_and_leaves_media_retryable() {
        let store = Arc::new(MemoryStore::new());
        let monitor = monitor_with(store.clone(), doc_with_images(3));

        let err = monitor.scan_and_analyze(10).await.unwrap_err();
        assert!(matches!(err, CredLensError::Config(_)));
        assert_eq!(monitor.badge_count().await, 0);

        // Key arrives; every item of the aborted batch analyzes on the next
        // cycle, not just the first.
        store
            .set(settings_keys::GEMINI_API_KEY, "test-key")
            .await
            .unwrap();
        assert_eq!(monitor.scan_and_analyze(10).await.unwrap(), 3);
        assert_eq!(monitor.badge_count().await, 3);
    }

    #[tokio::test]
    async fn clear_resets_badges_and_history() {
        let store = Arc::new(MemoryStore::with_api_key("test-key"));
        let monitor = monitor_with(store, doc_with_images(2));

        monitor.scan_and_analyze(10).await.unwrap();
        assert_eq!(monitor.badge_count().await, 2);

        monitor.clear().await;
        assert_eq!(monitor.badge_count().await, 0);

        // History gone: everything is re-analyzed.
        assert_eq!(monitor.scan_and_analyze(10).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn run_cycle_respects_auto_analyze_toggle() {
        let store = Arc::new(MemoryStore::with_api_key("test-key"));
        store
            .set(settings_keys::AUTO_ANALYZE, "false")
            .await
            .unwrap();
        let monitor = monitor_with(store.clone(), doc_with_images(2));

        monitor.run_cycle(10).await;
        assert_eq!(monitor.badge_count().await, 0);

        store.set(settings_keys::AUTO_ANALYZE, "true").await.unwrap();
        monitor.run_cycle(10).await;
        assert_eq!(monitor.badge_count().await, 2);
    }

    #[tokio::test]
    async fn badge_cap_bounds_total_overlays() {
        let store = Arc::new(MemoryStore::with_api_key("test-key"));
        let monitor = monitor_with(store, doc_with_images(OVERLAY_CAP + 5));

        let mut total = 0;
        loop {
            let analyzed = monitor.scan_and_analyze(25).await.unwrap();
            if analyzed == 0 {
                break;
            }
            total += analyzed;
        }
        assert_eq!(total, OVERLAY_CAP);
        assert_eq!(monitor.badge_count().await, OVERLAY_CAP);
    }
}
