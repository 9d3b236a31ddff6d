//! Builds validated [`ProductCombo`]s from operator picks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use stockmap_core::{ComboItem, ProductCombo};

use crate::error::ComboError;
use crate::normalize::normalize_name;

/// Unvalidated combo as picked by an operator.
///
/// `id` is set when editing an existing combo; a fresh `combo-<uuid>` id is
/// generated otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboDraft {
    pub id: Option<String>,
    pub name: String,
    pub items: Vec<ComboItem>,
}

impl ComboDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, product_name: impl Into<String>, quantity: u32) -> Self {
        self.items.push(ComboItem {
            product_name: product_name.into(),
            quantity,
        });
        self
    }
}

/// Validates `draft` and folds duplicate picks into one item.
///
/// Items are deduplicated by normalized product name; the first pick's
/// spelling is kept and quantities are summed (saturating).
///
/// # Errors
///
/// Returns [`ComboError`] when the name is blank, there are no items, an item
/// has a blank product name, or an item has quantity zero.
pub fn build_combo(draft: ComboDraft, now: DateTime<Utc>) -> Result<ProductCombo, ComboError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ComboError::EmptyName);
    }
    if draft.items.is_empty() {
        return Err(ComboError::NoItems);
    }

    let mut items: Vec<ComboItem> = Vec::with_capacity(draft.items.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in draft.items {
        let product_name = item.product_name.trim();
        if product_name.is_empty() {
            return Err(ComboError::EmptyProductName);
        }
        if item.quantity == 0 {
            return Err(ComboError::ZeroQuantity {
                product_name: product_name.to_string(),
            });
        }

        let key = normalize_name(product_name);
        if let Some(&pos) = index.get(&key) {
            let existing = &mut items[pos];
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            index.insert(key, items.len());
            items.push(ComboItem {
                product_name: product_name.to_string(),
                quantity: item.quantity,
            });
        }
    }

    let id = draft
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("combo-{}", uuid::Uuid::new_v4()));

    Ok(ProductCombo {
        id,
        name: name.to_string(),
        items,
        created_at: now,
    })
}
