use crate::app_config::{AppConfig, Environment, StoreConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the mapping store settings.
///
/// Local reconciliation commands use this so they run without
/// `DATABASE_URL` or the inventory webhook configured.
///
/// # Errors
///
/// Returns `ConfigError` if a store setting is present but invalid.
pub fn load_store_config() -> Result<StoreConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_store_config(&|key: &str| std::env::var(key))
}

fn build_store_config<F>(lookup: &F) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let store_dir = std::path::PathBuf::from(
        lookup("STOCKMAP_STORE_DIR").unwrap_or_else(|_| "./data".to_string()),
    );

    let timeout_var = "STOCKMAP_WEBHOOK_TIMEOUT_SECS";
    let webhook_timeout_secs = lookup(timeout_var)
        .unwrap_or_else(|_| "30".to_string())
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: timeout_var.to_string(),
            reason: e.to_string(),
        })?;
    if webhook_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: timeout_var.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(StoreConfig {
        store_dir,
        dictionary_webhook_url: optional("STOCKMAP_DICTIONARY_WEBHOOK_URL"),
        combo_dictionary_webhook_url: optional("STOCKMAP_COMBO_DICTIONARY_WEBHOOK_URL"),
        webhook_timeout_secs,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        or_default(var, default)
            .parse::<i64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let inventory_webhook_url = require("STOCKMAP_INVENTORY_WEBHOOK_URL")?;
    let StoreConfig {
        store_dir,
        dictionary_webhook_url,
        combo_dictionary_webhook_url,
        webhook_timeout_secs,
    } = build_store_config(&lookup)?;

    let env = parse_environment(&or_default("STOCKMAP_ENV", "development"))?;

    let bind_addr = parse_addr("STOCKMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOCKMAP_LOG_LEVEL", "info");

    let default_operator = or_default("STOCKMAP_DEFAULT_OPERATOR", "admin");
    let low_stock_threshold = parse_i64("STOCKMAP_LOW_STOCK_THRESHOLD", "5")?;

    let db_max_connections = parse_u32("STOCKMAP_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("STOCKMAP_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("STOCKMAP_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let db_page_size = parse_i64("STOCKMAP_DB_PAGE_SIZE", "1000")?;
    if db_page_size < 1 {
        return Err(invalid(
            "STOCKMAP_DB_PAGE_SIZE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        store_dir,
        inventory_webhook_url,
        dictionary_webhook_url,
        combo_dictionary_webhook_url,
        webhook_timeout_secs,
        default_operator,
        low_stock_threshold,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        db_page_size,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOCKMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
