use thiserror::Error;

/// Failures of the local persistence medium.
///
/// These never cross the [`crate::MappingStore`] boundary: reads degrade to
/// empty collections and writes are logged and dropped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error for {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("stored data for {key} is not valid JSON: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComboError {
    #[error("combo name must not be empty")]
    EmptyName,

    #[error("combo must contain at least one product")]
    NoItems,

    #[error("combo item product name must not be empty")]
    EmptyProductName,

    #[error("quantity for '{product_name}' must be at least 1")]
    ZeroQuantity { product_name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("unmapped name must not be empty")]
    EmptyUnmappedName,

    #[error("mapped product name must not be empty")]
    EmptyProductName,

    #[error(transparent)]
    Combo(#[from] ComboError),
}
