use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use credlens_common::{Config, MediaDescriptor};
use credlens_engine::model::GeminiVision;
use credlens_engine::service::{AnalysisService, Request};
use credlens_engine::settings::{MemoryStore, SettingsStore};
use credlens_engine::AnalysisOrchestrator;

/// Run the credibility pipeline against one piece of media or text.
#[derive(Parser, Debug)]
#[command(name = "credlens", about = "Credibility analysis for media and text")]
struct Args {
    /// URL of an image to analyze.
    #[arg(long, conflicts_with_all = ["video_url", "text"])]
    image_url: Option<String>,

    /// URL of a video to analyze.
    #[arg(long, conflicts_with = "text")]
    video_url: Option<String>,

    /// Text to fact-check.
    #[arg(long)]
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("credlens=info".parse()?))
        .init();

    info!("CredLens starting...");

    let args = Args::parse();

    // Load config
    let config = Config::from_env();
    config.log_redacted();

    let store = Arc::new(MemoryStore::with_api_key(&config.gemini_api_key));
    let orchestrator = AnalysisOrchestrator::new(store as Arc<dyn SettingsStore>)
        .with_model(Arc::new(GeminiVision::new(&config.model)));
    let service = AnalysisService::new(Arc::new(orchestrator));

    let request = if let Some(url) = args.image_url {
        Request::AnalyzeMedia {
            media: MediaDescriptor::image(url, None),
        }
    } else if let Some(url) = args.video_url {
        Request::AnalyzeMedia {
            media: MediaDescriptor::video(url, None),
        }
    } else if let Some(text) = args.text {
        Request::AnalyzeText { text }
    } else {
        anyhow::bail!("Provide one of --image-url, --video-url, or --text");
    };

    let response = service.handle(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
