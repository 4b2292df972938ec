use std::env;

use tracing::info;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Process configuration loaded from environment variables. Used by the CLI
/// entry point; the pipeline itself reads credentials through the settings
/// store so they are never stale.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: required_env("GEMINI_API_KEY"),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    /// Log the loaded config without exposing the credential.
    pub fn log_redacted(&self) {
        info!(
            model = self.model.as_str(),
            api_key_set = !self.gemini_api_key.is_empty(),
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
