//! Fire-and-forget mirror of saved mappings to the dictionary webhooks.
//!
//! [`DictionaryMirror`] is an outbox: [`DictionarySink::submit`] queues the
//! entry on a bounded channel and returns immediately, and a background
//! worker delivers entries one at a time. Failed deliveries are logged and
//! dropped.

use stockmap_reconcile::{DictionaryEntry, DictionarySink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{DictionaryEndpoints, WebhookClient};
use crate::error::WebhookError;
use crate::payload::{ComboDictionaryPayload, ProductDictionaryPayload};

/// Queue depth before new entries are dropped.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct DictionaryMirror {
    tx: mpsc::Sender<DictionaryEntry>,
}

impl DictionaryMirror {
    /// Starts the delivery worker on the current Tokio runtime.
    ///
    /// The worker exits once every `DictionaryMirror` clone is dropped and the
    /// queue is drained.
    #[must_use]
    pub fn spawn(
        client: WebhookClient,
        endpoints: DictionaryEndpoints,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(client, endpoints, rx));
        (Self { tx }, handle)
    }
}

impl DictionarySink for DictionaryMirror {
    fn submit(&self, entry: DictionaryEntry) {
        if let Err(e) = self.tx.try_send(entry) {
            let (reason, entry) = match e {
                mpsc::error::TrySendError::Full(entry) => ("outbox full", entry),
                mpsc::error::TrySendError::Closed(entry) => ("mirror stopped", entry),
            };
            tracing::warn!(kind = entry.kind(), reason, "dictionary entry dropped");
        }
    }
}

async fn run_worker(
    client: WebhookClient,
    endpoints: DictionaryEndpoints,
    mut rx: mpsc::Receiver<DictionaryEntry>,
) {
    while let Some(entry) = rx.recv().await {
        let kind = entry.kind();
        match deliver(&client, &endpoints, entry).await {
            Ok(true) => tracing::info!(kind, "dictionary entry mirrored"),
            Ok(false) => tracing::debug!(kind, "no dictionary URL configured; entry discarded"),
            Err(e) if e.is_timeout() => {
                tracing::warn!(kind, error = %e, "dictionary webhook timed out; entry dropped");
            }
            Err(e) => tracing::warn!(kind, error = %e, "dictionary webhook failed; entry dropped"),
        }
    }
    tracing::debug!("dictionary mirror worker stopped");
}

/// Sends one entry. Returns `Ok(false)` when its endpoint is not configured.
///
/// # Errors
///
/// Returns [`WebhookError`] when the webhook call fails.
pub async fn deliver(
    client: &WebhookClient,
    endpoints: &DictionaryEndpoints,
    entry: DictionaryEntry,
) -> Result<bool, WebhookError> {
    match entry {
        DictionaryEntry::Product { existing, new_name } => {
            let Some(url) = &endpoints.product else {
                return Ok(false);
            };
            let body = ProductDictionaryPayload {
                producto_existente: existing,
                producto_nuevo: new_name,
            };
            client.post_json(url, &body).await?;
        }
        DictionaryEntry::Combo { name, items } => {
            let Some(url) = &endpoints.combo else {
                return Ok(false);
            };
            let body = ComboDictionaryPayload {
                nombre_combo: name,
                productos_combo: items,
            };
            client.post_json(url, &body).await?;
        }
    }
    Ok(true)
}
