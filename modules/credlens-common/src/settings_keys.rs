//! Keys for the persisted key-value settings store. Settings are read fresh
//! on every operation that needs them and never cached across operations.

pub const GEMINI_API_KEY: &str = "geminiKey";
pub const AUTO_ANALYZE: &str = "autoAnalyze";
pub const ENABLE_NOTIFICATIONS: &str = "enableNotifications";
pub const DATABASE_CHECK: &str = "databaseCheck";
pub const CONFIDENCE_THRESHOLD: &str = "confidenceThreshold";
