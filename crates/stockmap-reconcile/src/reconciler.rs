use std::sync::Arc;

use chrono::Utc;
use stockmap_core::{OrderRecord, ProductCombo, ProductMapping, UnmappedProductAggregate};

use crate::aggregate::aggregate_unmapped;
use crate::combo::{build_combo, ComboDraft};
use crate::error::ReconcileError;
use crate::normalize::strip_for_dictionary;
use crate::sink::{DictionaryEntry, DictionarySink};
use crate::store::{ComboDeletion, MappingRequest, MappingStore};

/// Resolves unmapped order tokens against the local store and notifies the
/// remote dictionary.
///
/// Every save commits to the [`MappingStore`] before the entry is handed to
/// the [`DictionarySink`]; sink failures never undo a local save.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn MappingStore>,
    sink: Arc<dyn DictionarySink>,
}

impl Reconciler {
    #[must_use]
    pub fn new(store: Arc<dyn MappingStore>, sink: Arc<dyn DictionarySink>) -> Self {
        Self { store, sink }
    }

    /// Aggregates the unmapped tokens of `orders` that have no saved mapping.
    #[must_use]
    pub fn unmapped(&self, orders: &[OrderRecord]) -> Vec<UnmappedProductAggregate> {
        aggregate_unmapped(orders, &self.store.load_mappings())
    }

    #[must_use]
    pub fn mappings(&self) -> Vec<ProductMapping> {
        self.store.mappings()
    }

    #[must_use]
    pub fn combos(&self) -> Vec<ProductCombo> {
        self.store.combos()
    }

    /// Maps `unmapped_name` onto a single inventory product.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when either name is blank.
    pub fn map_to_product(
        &self,
        unmapped_name: &str,
        product_name: &str,
        quantity: Option<u32>,
    ) -> Result<ProductMapping, ReconcileError> {
        let unmapped_name = unmapped_name.trim();
        let product_name = product_name.trim();
        if unmapped_name.is_empty() {
            return Err(ReconcileError::EmptyUnmappedName);
        }
        if product_name.is_empty() {
            return Err(ReconcileError::EmptyProductName);
        }

        let mapping = self.store.save_mapping(
            MappingRequest::product(unmapped_name, product_name).with_quantity(quantity),
        );

        self.sink.submit(DictionaryEntry::Product {
            existing: product_name.to_string(),
            new_name: strip_for_dictionary(unmapped_name),
        });
        Ok(mapping)
    }

    /// Builds and saves a combo from `draft`, then maps `unmapped_name` onto it.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the unmapped name is blank or the draft
    /// fails validation. Nothing is saved in either case.
    pub fn map_to_combo(
        &self,
        unmapped_name: &str,
        draft: ComboDraft,
    ) -> Result<(ProductCombo, ProductMapping), ReconcileError> {
        let unmapped_name = unmapped_name.trim();
        if unmapped_name.is_empty() {
            return Err(ReconcileError::EmptyUnmappedName);
        }
        let combo = build_combo(draft, Utc::now())?;

        self.store.save_combo(combo.clone());
        let mapping = self
            .store
            .save_mapping(MappingRequest::combo(unmapped_name, &combo.id));

        self.sink.submit(DictionaryEntry::Combo {
            name: strip_for_dictionary(unmapped_name),
            items: combo.items_summary(),
        });
        Ok((combo, mapping))
    }

    /// Saves a combo without mapping anything onto it.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Combo`] when the draft fails validation.
    pub fn save_combo(&self, draft: ComboDraft) -> Result<ProductCombo, ReconcileError> {
        let combo = build_combo(draft, Utc::now())?;
        self.store.save_combo(combo.clone());
        Ok(combo)
    }

    /// Deletes a combo together with the mappings pointing at it. The remote
    /// dictionary is not told about deletions.
    #[must_use]
    pub fn delete_combo(&self, combo_id: &str) -> ComboDeletion {
        self.store.delete_combo(combo_id)
    }
}
