pub mod config;
pub mod error;
pub mod settings_keys;
pub mod types;

pub use config::Config;
pub use error::CredLensError;
pub use types::*;
