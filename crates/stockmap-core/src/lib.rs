pub mod app_config;
pub mod config;
pub mod inventory;
pub mod kinds;
pub mod mapping;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, StoreConfig};
pub use config::{load_app_config, load_app_config_from_env, load_store_config};
pub use inventory::{InventoryProduct, OrderRecord};
pub use kinds::{MutationKind, OrderStatus, PaymentMethod};
pub use mapping::{
    ComboItem, OrderProductToken, ProductCombo, ProductMapping, UnmappedProductAggregate,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
