//! Folds unmapped order tokens into per-key aggregates.

use std::collections::{BTreeSet, HashMap};

use stockmap_core::{OrderRecord, UnmappedProductAggregate};

use crate::normalize::{display_name, normalize_name};
use crate::parse::parse_product_tokens;

/// Normalized unmapped name → mapped product name.
pub type MappingTable = HashMap<String, String>;

/// Builds the unmapped-product aggregates for `orders`, skipping every key
/// that already has an entry in `mappings`.
///
/// Each unmapped token adds one occurrence; an order appearing several times
/// for a key is still listed once in `order_ids`. The result is sorted by
/// `occurrences` descending. The sort is stable, so equal counts keep the
/// order in which their key was first seen while walking `orders`.
#[must_use]
pub fn aggregate_unmapped(
    orders: &[OrderRecord],
    mappings: &MappingTable,
) -> Vec<UnmappedProductAggregate> {
    let mut aggregates: Vec<UnmappedProductAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for order in orders {
        for token in parse_product_tokens(&order.products) {
            if !token.is_unmapped {
                continue;
            }
            let key = normalize_name(&token.name);
            if key.is_empty() || mappings.contains_key(&key) {
                continue;
            }

            if let Some(&pos) = index.get(&key) {
                let entry = &mut aggregates[pos];
                entry.occurrences += 1;
                entry.order_ids.insert(order.id.clone());
                if order.created_at > entry.last_seen {
                    entry.last_seen = order.created_at;
                }
            } else {
                index.insert(key.clone(), aggregates.len());
                aggregates.push(UnmappedProductAggregate {
                    id: format!("unmapped:{key}"),
                    name: display_name(&token.name),
                    key,
                    order_ids: BTreeSet::from([order.id.clone()]),
                    occurrences: 1,
                    last_seen: order.created_at,
                });
            }
        }
    }

    aggregates.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    aggregates
}
