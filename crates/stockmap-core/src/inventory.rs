use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kinds::{OrderStatus, PaymentMethod};

/// A product row as stored in the upstream inventory table.
///
/// Identity upstream is `(store, name)`; `id` is only a positional fallback
/// assigned per query result and must not be relied on across reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryProduct {
    pub id: i64,
    /// Product name exactly as stored, including any stray whitespace.
    pub name: String,
    pub quantity: i64,
    pub store: String,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
}

impl InventoryProduct {
    /// Returns `true` when the quantity is at or below `threshold`, or below
    /// the row's own `min_stock` when one is set.
    #[must_use]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.quantity <= threshold || self.min_stock.is_some_and(|min| self.quantity < min)
    }
}

/// The slice of an order row the reconciliation aggregator consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    /// Free-text, comma-separated product list, e.g. `"2 X ALPHA, (1 X Foo)"`.
    pub products: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub store: Option<String>,
    /// Raw upstream status text; see [`OrderRecord::status_kind`].
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl OrderRecord {
    #[must_use]
    pub fn status_kind(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(OrderStatus::parse)
    }

    #[must_use]
    pub fn payment_kind(&self) -> Option<PaymentMethod> {
        self.payment_method.as_deref().and_then(PaymentMethod::parse)
    }
}
