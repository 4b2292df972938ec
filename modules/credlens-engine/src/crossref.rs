use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use credlens_common::CheckOutcome;

use crate::sources::{SourceRegistry, TrustedSource};

/// Per-source claim lookup. The default stub never performs a network call;
/// a real integration implements this against the source's endpoint.
#[async_trait]
pub trait FactCheckLookup: Send + Sync {
    async fn check(&self, source: &TrustedSource, claims: &[String]) -> Result<CheckOutcome>;
}

/// Always answers checked/undetermined. This is the documented extension
/// point, not a bug: scores stay neutral until a real lookup exists.
pub struct StubLookup;

#[async_trait]
impl FactCheckLookup for StubLookup {
    async fn check(&self, _source: &TrustedSource, _claims: &[String]) -> Result<CheckOutcome> {
        Ok(CheckOutcome::undetermined())
    }
}

/// Checks extracted claims against every registered trusted source. Each
/// source reports its own outcome; one source failing never aborts the batch.
pub struct ClaimCrossReferencer {
    registry: SourceRegistry,
    lookup: Arc<dyn FactCheckLookup>,
}

impl ClaimCrossReferencer {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry,
            lookup: Arc::new(StubLookup),
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn FactCheckLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub async fn cross_reference(&self, claims: &[String]) -> BTreeMap<String, CheckOutcome> {
        let mut results = BTreeMap::new();

        for source in self.registry.iter() {
            let outcome = match self.lookup.check(source, claims).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(source = source.name.as_str(), error = %e, "Fact-check lookup failed");
                    CheckOutcome::failed(e.to_string())
                }
            };
            results.insert(source.name.clone(), outcome);
        }

        debug!(
            sources = results.len(),
            claims = claims.len(),
            "Cross-reference complete"
        );
        results
    }
}
