use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry parsed out of an order's free-text product field.
///
/// Derived per read from the raw string; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderProductToken {
    pub raw_text: String,
    /// For unmapped tokens this keeps the parenthesized form, e.g. `"(1 X Foo)"`.
    pub name: String,
    pub quantity: Option<u32>,
    pub is_unmapped: bool,
}

impl OrderProductToken {
    #[must_use]
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Every unmapped token sharing one normalized key, folded across orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedProductAggregate {
    /// Stable per normalized key.
    pub id: String,
    /// Normalized key the aggregate is grouped by.
    pub key: String,
    /// Display form of the first token seen for this key.
    pub name: String,
    pub order_ids: BTreeSet<String>,
    pub occurrences: u64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMapping {
    pub unmapped_name: String,
    pub mapped_product_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_combo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboItem {
    /// References an inventory product by name; not checked against inventory.
    pub product_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCombo {
    pub id: String,
    pub name: String,
    pub items: Vec<ComboItem>,
    pub created_at: DateTime<Utc>,
}

impl ProductCombo {
    /// Renders the items as `"<qty> X <item>, <qty> X <item>"`.
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} X {}", item.quantity, item.product_name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
