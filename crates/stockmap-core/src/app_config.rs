use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding the local mapping and combo JSON files.
    pub store_dir: PathBuf,
    /// n8n/Railway endpoint that performs inventory create/edit/delete.
    pub inventory_webhook_url: String,
    /// Add-to-dictionary endpoint. `None` disables the single-product mirror.
    pub dictionary_webhook_url: Option<String>,
    /// Add-combo-to-dictionary endpoint. `None` disables the combo mirror.
    pub combo_dictionary_webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    /// Operator name sent as `usuario` when a request does not carry one.
    pub default_operator: String,
    pub low_stock_threshold: i64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_page_size: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("store_dir", &self.store_dir)
            .field("database_url", &"[redacted]")
            .field("inventory_webhook_url", &"[redacted]")
            .field(
                "dictionary_webhook_url",
                &self.dictionary_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "combo_dictionary_webhook_url",
                &self
                    .combo_dictionary_webhook_url
                    .as_ref()
                    .map(|_| "[redacted]"),
            )
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .field("default_operator", &self.default_operator)
            .field("low_stock_threshold", &self.low_stock_threshold)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("db_page_size", &self.db_page_size)
            .finish()
    }
}

impl AppConfig {
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            store_dir: self.store_dir.clone(),
            dictionary_webhook_url: self.dictionary_webhook_url.clone(),
            combo_dictionary_webhook_url: self.combo_dictionary_webhook_url.clone(),
            webhook_timeout_secs: self.webhook_timeout_secs,
        }
    }
}

/// The subset of [`AppConfig`] needed to read and write the local mapping
/// store and mirror saves to the dictionary webhooks.
#[derive(Clone)]
pub struct StoreConfig {
    pub store_dir: PathBuf,
    pub dictionary_webhook_url: Option<String>,
    pub combo_dictionary_webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("store_dir", &self.store_dir)
            .field(
                "dictionary_webhook_url",
                &self.dictionary_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "combo_dictionary_webhook_url",
                &self
                    .combo_dictionary_webhook_url
                    .as_ref()
                    .map(|_| "[redacted]"),
            )
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .finish()
    }
}
