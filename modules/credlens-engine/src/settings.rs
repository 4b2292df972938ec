use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use credlens_common::settings_keys;

/// Key-value settings collaborator. The browser layer backs this with its
/// own storage; tests and the CLI use `MemoryStore`. The pipeline reads
/// settings fresh on every operation — values are never cached across
/// operations, so a toggle takes effect on the next analysis.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(api_key: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(
            settings_keys::GEMINI_API_KEY.to_string(),
            api_key.to_string(),
        );
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed snapshot of the user-facing toggles, loaded per operation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auto_analyze: bool,
    pub enable_notifications: bool,
    pub database_check: bool,
    /// 0-100.
    pub confidence_threshold: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_analyze: true,
            enable_notifications: true,
            database_check: true,
            confidence_threshold: 50,
        }
    }
}

impl Settings {
    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            auto_analyze: load_flag(store, settings_keys::AUTO_ANALYZE, defaults.auto_analyze)
                .await?,
            enable_notifications: load_flag(
                store,
                settings_keys::ENABLE_NOTIFICATIONS,
                defaults.enable_notifications,
            )
            .await?,
            database_check: load_flag(
                store,
                settings_keys::DATABASE_CHECK,
                defaults.database_check,
            )
            .await?,
            confidence_threshold: store
                .get(settings_keys::CONFIDENCE_THRESHOLD)
                .await?
                .and_then(|v| v.parse::<u8>().ok())
                .map(|v| v.min(100))
                .unwrap_or(defaults.confidence_threshold),
        })
    }
}

async fn load_flag(store: &dyn SettingsStore, key: &str, default: bool) -> Result<bool> {
    Ok(match store.get(key).await?.as_deref() {
        Some("false") => false,
        Some("true") => true,
        _ => default,
    })
}

/// The one documented write path: saving the model credential.
pub async fn save_api_key(store: &dyn SettingsStore, api_key: &str) -> Result<()> {
    store.set(settings_keys::GEMINI_API_KEY, api_key).await
}
