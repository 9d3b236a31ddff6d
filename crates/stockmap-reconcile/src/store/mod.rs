//! Session-spanning persistence of product mappings and combos.
//!
//! [`MappingStore`] is the repository interface callers use.
//! [`LocalMappingStore`] implements it as two whole JSON arrays kept under
//! fixed keys in a [`StorageBackend`]: each save loads the full collection,
//! filters, appends and writes it back. Storage failures never reach the
//! caller; reads fall back to empty collections and failed writes are
//! logged and dropped.

mod file;
mod memory;

use std::sync::Mutex;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use stockmap_core::{ProductCombo, ProductMapping};

use crate::aggregate::MappingTable;
use crate::error::StoreError;
use crate::normalize::normalize_name;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Fixed keys the two collections live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Mappings,
    Combos,
}

impl StoreKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Mappings => "product_mappings",
            StoreKey::Combos => "product_combos",
        }
    }
}

/// Raw key-value medium underneath [`LocalMappingStore`].
pub trait StorageBackend: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the medium cannot be read.
    fn read(&self, key: StoreKey) -> Result<Option<String>, StoreError>;

    /// Replaces whatever is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the medium cannot be written.
    fn write(&self, key: StoreKey, contents: &str) -> Result<(), StoreError>;
}

/// Input to [`MappingStore::save_mapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRequest {
    pub unmapped_name: String,
    pub mapped_product_name: String,
    pub is_combo: bool,
    pub combo_id: Option<String>,
    pub quantity: Option<u32>,
}

impl MappingRequest {
    #[must_use]
    pub fn product(unmapped_name: impl Into<String>, mapped_product_name: impl Into<String>) -> Self {
        Self {
            unmapped_name: unmapped_name.into(),
            mapped_product_name: mapped_product_name.into(),
            is_combo: false,
            combo_id: None,
            quantity: None,
        }
    }

    /// A mapping onto a combo; the mapped name is `"COMBO:<id>"`.
    #[must_use]
    pub fn combo(unmapped_name: impl Into<String>, combo_id: &str) -> Self {
        Self {
            unmapped_name: unmapped_name.into(),
            mapped_product_name: format!("COMBO:{combo_id}"),
            is_combo: true,
            combo_id: Some(combo_id.to_string()),
            quantity: None,
        }
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: Option<u32>) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Outcome of [`MappingStore::delete_combo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboDeletion {
    pub combo_removed: bool,
    pub mappings_removed: usize,
}

impl ComboDeletion {
    /// True when the combo was absent and no mapping referenced it.
    /// Mappings left behind by an already-deleted combo still count.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.combo_removed && self.mappings_removed == 0
    }
}

/// Repository for mappings and combos. Single-writer semantics are assumed;
/// concurrent writers from other processes may overwrite each other.
pub trait MappingStore: Send + Sync {
    /// Normalized unmapped name → mapped product name, last write wins.
    fn load_mappings(&self) -> MappingTable;

    fn mappings(&self) -> Vec<ProductMapping>;

    fn combos(&self) -> Vec<ProductCombo>;

    /// Replaces any mapping with the same normalized key and returns the
    /// stored record.
    fn save_mapping(&self, request: MappingRequest) -> ProductMapping;

    /// Inserts `combo`, or replaces the stored combo with the same id.
    fn save_combo(&self, combo: ProductCombo);

    /// Removes the combo and every mapping pointing at it.
    fn delete_combo(&self, combo_id: &str) -> ComboDeletion;
}

pub struct LocalMappingStore<B> {
    backend: B,
    write_lock: Mutex<()>,
}

impl<B: StorageBackend> LocalMappingStore<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    fn read_collection<T: DeserializeOwned>(&self, key: StoreKey) -> Vec<T> {
        match self.try_read_collection(key) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "mapping store read failed; treating as empty");
                Vec::new()
            }
        }
    }

    fn try_read_collection<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Vec<T>, StoreError> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: key.as_str(),
            source,
        })
    }

    fn write_collection<T: Serialize>(&self, key: StoreKey, items: &[T]) {
        let result = serde_json::to_string(items)
            .map_err(|source| StoreError::Encode {
                key: key.as_str(),
                source,
            })
            .and_then(|json| self.backend.write(key, &json));
        if let Err(e) = result {
            tracing::warn!(key = key.as_str(), error = %e, "mapping store write failed; change not persisted");
        }
    }

    /// Serializes read-modify-write cycles within this process. A poisoned
    /// lock is recovered since the guarded data lives in the backend.
    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<B: StorageBackend> MappingStore for LocalMappingStore<B> {
    fn load_mappings(&self) -> MappingTable {
        let mut table = MappingTable::new();
        for mapping in self.read_collection::<ProductMapping>(StoreKey::Mappings) {
            table.insert(
                normalize_name(&mapping.unmapped_name),
                mapping.mapped_product_name,
            );
        }
        table
    }

    fn mappings(&self) -> Vec<ProductMapping> {
        self.read_collection(StoreKey::Mappings)
    }

    fn combos(&self) -> Vec<ProductCombo> {
        self.read_collection(StoreKey::Combos)
    }

    fn save_mapping(&self, request: MappingRequest) -> ProductMapping {
        let _guard = self.lock();
        let key = normalize_name(&request.unmapped_name);

        let mut mappings: Vec<ProductMapping> = self.read_collection(StoreKey::Mappings);
        mappings.retain(|m| normalize_name(&m.unmapped_name) != key);

        let mapping = ProductMapping {
            unmapped_name: request.unmapped_name,
            mapped_product_name: request.mapped_product_name,
            created_at: Utc::now(),
            is_combo: request.is_combo,
            combo_id: request.combo_id,
            quantity: request.quantity,
        };
        mappings.push(mapping.clone());
        self.write_collection(StoreKey::Mappings, &mappings);

        tracing::info!(key = %key, mapped = %mapping.mapped_product_name, "saved product mapping");
        mapping
    }

    fn save_combo(&self, combo: ProductCombo) {
        let _guard = self.lock();
        let mut combos: Vec<ProductCombo> = self.read_collection(StoreKey::Combos);
        if let Some(existing) = combos.iter_mut().find(|c| c.id == combo.id) {
            *existing = combo;
        } else {
            combos.push(combo);
        }
        self.write_collection(StoreKey::Combos, &combos);
    }

    fn delete_combo(&self, combo_id: &str) -> ComboDeletion {
        let _guard = self.lock();

        let mut combos: Vec<ProductCombo> = self.read_collection(StoreKey::Combos);
        let combos_before = combos.len();
        combos.retain(|c| c.id != combo_id);
        let combo_removed = combos.len() != combos_before;
        if combo_removed {
            self.write_collection(StoreKey::Combos, &combos);
        }

        let mut mappings: Vec<ProductMapping> = self.read_collection(StoreKey::Mappings);
        let mappings_before = mappings.len();
        mappings.retain(|m| m.combo_id.as_deref() != Some(combo_id));
        let mappings_removed = mappings_before - mappings.len();
        if mappings_removed > 0 {
            self.write_collection(StoreKey::Mappings, &mappings);
        }

        tracing::info!(combo_id, combo_removed, mappings_removed, "deleted combo");
        ComboDeletion {
            combo_removed,
            mappings_removed,
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
