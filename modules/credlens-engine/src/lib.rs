//! The credibility pipeline: model analysis, parsing, claim
//! cross-referencing, scoring, periodic page scanning, and the messaging
//! surface the UI layers talk to.

pub mod crossref;
pub mod fetch;
pub mod model;
pub mod monitor;
pub mod orchestrator;
pub mod parser;
pub mod scanner;
pub mod score;
pub mod service;
pub mod settings;
pub mod sources;

#[cfg(feature = "test-support")]
pub mod testing;

pub use crossref::ClaimCrossReferencer;
pub use monitor::PageMonitor;
pub use orchestrator::AnalysisOrchestrator;
pub use scanner::PeriodicScanner;
pub use service::AnalysisService;
pub use sources::SourceRegistry;
