use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredLensError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream model error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Fact-check source error: {0}")]
    Source(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CredLensError {
    /// Config errors need user action; everything else may be retried or is
    /// absorbed into a degraded result before reaching the caller.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CredLensError::Config(_))
    }

    /// Short human-readable message with remediation where one exists.
    pub fn user_message(&self) -> String {
        match self {
            CredLensError::Config(_) => {
                "CredLens is not configured. Please add your Gemini API key in settings."
                    .to_string()
            }
            CredLensError::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            CredLensError::Upstream { status: 429, .. } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            CredLensError::Upstream { .. } => {
                "Analysis failed. Please try again.".to_string()
            }
            CredLensError::Parse(_) | CredLensError::Source(_) | CredLensError::Anyhow(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_not_retryable() {
        assert!(!CredLensError::Config("missing key".into()).is_retryable());
        assert!(CredLensError::Network("refused".into()).is_retryable());
        assert!(CredLensError::Upstream {
            status: 500,
            message: "oops".into()
        }
        .is_retryable());
    }

    #[test]
    fn rate_limit_gets_specific_message() {
        let err = CredLensError::Upstream {
            status: 429,
            message: "quota".into(),
        };
        assert!(err.user_message().contains("Too many requests"));

        let err = CredLensError::Config("no key".into());
        assert!(err.user_message().contains("settings"));
    }
}
