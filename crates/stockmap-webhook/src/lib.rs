//! Outbound webhook plumbing: the inventory mutation webhook, the two
//! dictionary webhooks and the fire-and-forget dictionary mirror.

pub mod client;
pub mod error;
pub mod mirror;
pub mod payload;

pub use client::{parse_url, DictionaryEndpoints, WebhookClient, NOT_FOUND_MESSAGE};
pub use error::{PayloadError, WebhookError};
pub use mirror::{DictionaryMirror, DEFAULT_OUTBOX_CAPACITY};
pub use payload::{
    coerce_whole_number, ComboDictionaryPayload, ComboDictionaryRequest, DeletePayload,
    MutationPayload, MutationRequest, ProductDictionaryPayload, ProductDictionaryRequest,
    UpsertPayload,
};
