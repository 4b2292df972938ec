//! Periodic page scanning. A fixed-interval loop asks its target to run one
//! scan cycle; `stop` takes effect between cycles, never mid-cycle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default pause between scan cycles.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(5);
/// How many newly discovered items one cycle may analyze.
pub const DEFAULT_BATCH_LIMIT: usize = 10;

/// One scan cycle over the page: discover media, analyze up to `batch_limit`
/// new items, render overlays.
#[async_trait]
pub trait ScanTarget: Send + Sync {
    async fn run_cycle(&self, batch_limit: usize);
}

/// Drives a `ScanTarget` on a fixed cadence. `start` and `stop` are both
/// idempotent; dropping a running scanner stops it.
pub struct PeriodicScanner {
    target: Arc<dyn ScanTarget>,
    interval: Duration,
    batch_limit: usize,
    handle: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl PeriodicScanner {
    pub fn new(target: Arc<dyn ScanTarget>) -> Self {
        Self {
            target,
            interval: DEFAULT_SCAN_INTERVAL,
            batch_limit: DEFAULT_BATCH_LIMIT,
            handle: None,
            stop_tx: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the scan loop. A no-op when already running.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Scanner already running");
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let target = Arc::clone(&self.target);
        let interval = self.interval;
        let batch_limit = self.batch_limit;

        let handle = tokio::spawn(async move {
            // The first tick completes immediately, so the page is scanned as
            // soon as the loop starts.
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        target.run_cycle(batch_limit).await;
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Scan loop exited");
        });

        self.handle = Some(handle);
        self.stop_tx = Some(stop_tx);
        info!(interval_secs = self.interval.as_secs(), "Scanner started");
    }

    /// Signal the loop to stop. An in-flight cycle runs to completion; the
    /// loop exits before the next tick. A no-op when already stopped.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            info!("Scanner stopped");
        }
        self.handle = None;
    }
}

impl Drop for PeriodicScanner {
    fn drop(&mut self) {
        self.stop();
    }
}
