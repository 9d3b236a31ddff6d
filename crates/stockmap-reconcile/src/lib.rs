//! Reconciliation of unmapped order line-items against inventory.
//!
//! Order product strings are parsed into tokens ([`parse`]), keyed by a
//! canonical name ([`normalize`]), folded into per-key aggregates
//! ([`aggregate`]), and resolved by saving a mapping to a single product or a
//! combo ([`store`], [`combo`]). [`Reconciler`] ties the local commit to the
//! best-effort dictionary notification ([`sink`]).

pub mod aggregate;
pub mod combo;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod reconciler;
pub mod sink;
pub mod store;

pub use aggregate::{aggregate_unmapped, MappingTable};
pub use combo::{build_combo, ComboDraft};
pub use error::{ComboError, ReconcileError, StoreError};
pub use normalize::{display_name, normalize_name, strip_for_dictionary};
pub use parse::parse_product_tokens;
pub use reconciler::Reconciler;
pub use sink::{DictionaryEntry, DictionarySink, DiscardSink};
pub use store::{
    ComboDeletion, FileBackend, LocalMappingStore, MappingRequest, MappingStore, MemoryBackend,
    StorageBackend, StoreKey,
};
