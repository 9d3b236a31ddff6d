//! Outbound notification of saved mappings to the remote dictionary.

/// A saved mapping as the remote dictionary needs to hear about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryEntry {
    /// `existing` is the inventory product, `new_name` the bare unmapped name.
    Product { existing: String, new_name: String },
    /// `items` is the `"<qty> X <item>, ..."` rendering of the combo.
    Combo { name: String, items: String },
}

impl DictionaryEntry {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DictionaryEntry::Product { .. } => "product",
            DictionaryEntry::Combo { .. } => "combo",
        }
    }
}

/// Best-effort receiver of dictionary entries. Implementations must not
/// block and must not report failures back to the caller.
pub trait DictionarySink: Send + Sync {
    fn submit(&self, entry: DictionaryEntry);
}

/// Sink used when no dictionary is configured; entries are logged and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl DictionarySink for DiscardSink {
    fn submit(&self, entry: DictionaryEntry) {
        tracing::debug!(kind = entry.kind(), ?entry, "no dictionary configured; entry discarded");
    }
}
