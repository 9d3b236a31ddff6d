//! Reconciliation command handlers for the CLI.
//!
//! Mapping writes go to the same JSON store the server uses and are mirrored
//! to the dictionary webhooks when those are configured. `--dry-run` swaps in
//! an in-memory store and a discarding sink.

use std::sync::Arc;

use stockmap_core::{AppConfig, ComboItem, StoreConfig};
use stockmap_reconcile::{
    display_name, parse_product_tokens, ComboDraft, DictionarySink, DiscardSink, FileBackend,
    LocalMappingStore, MappingStore, MemoryBackend, Reconciler,
};
use stockmap_webhook::{DictionaryEndpoints, DictionaryMirror, WebhookClient, DEFAULT_OUTBOX_CAPACITY};
use tokio::task::JoinHandle;

/// A reconciler plus the mirror worker that must drain before exit.
struct Session {
    reconciler: Reconciler,
    mirror: Option<JoinHandle<()>>,
}

impl Session {
    fn open(config: &StoreConfig, dry_run: bool) -> anyhow::Result<Self> {
        if dry_run {
            let store = Arc::new(LocalMappingStore::new(MemoryBackend::new()));
            return Ok(Self {
                reconciler: Reconciler::new(store, Arc::new(DiscardSink)),
                mirror: None,
            });
        }

        let dictionary = DictionaryEndpoints::from_config(
            config.dictionary_webhook_url.as_deref(),
            config.combo_dictionary_webhook_url.as_deref(),
        )?;
        let mut mirror = None;
        let sink: Arc<dyn DictionarySink> =
            if dictionary.product.is_some() || dictionary.combo.is_some() {
                let client = WebhookClient::new(config.webhook_timeout_secs)?;
                let (outbox, handle) =
                    DictionaryMirror::spawn(client, dictionary, DEFAULT_OUTBOX_CAPACITY);
                mirror = Some(handle);
                Arc::new(outbox)
            } else {
                Arc::new(DiscardSink)
            };

        Ok(Self {
            reconciler: Reconciler::new(local_store(config), sink),
            mirror,
        })
    }

    /// Drops the reconciler and waits for queued dictionary entries.
    async fn finish(self) {
        let Self { reconciler, mirror } = self;
        drop(reconciler);
        if let Some(handle) = mirror {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "dictionary mirror task ended abnormally");
            }
        }
    }
}

fn local_store(config: &StoreConfig) -> Arc<dyn MappingStore> {
    Arc::new(LocalMappingStore::new(FileBackend::new(config.store_dir.clone())))
}

/// Print the tokens of a raw order product string.
pub(crate) fn run_parse(text: &str) {
    let tokens = parse_product_tokens(text);
    if tokens.is_empty() {
        println!("no products found");
        return;
    }
    println!("{:<10}{:<6}NAME", "KIND", "QTY");
    for token in &tokens {
        let kind = if token.is_unmapped { "unmapped" } else { "mapped" };
        let qty = token
            .quantity
            .map_or_else(|| "-".to_string(), |q| q.to_string());
        println!("{kind:<10}{qty:<6}{}", token.name);
    }
}

/// List unmapped products across the orders matching `filters`.
///
/// # Errors
///
/// Returns an error if the order query fails.
pub(crate) async fn run_unmapped(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    filters: stockmap_db::OrderFilters<'_>,
    limit: usize,
) -> anyhow::Result<()> {
    let orders = stockmap_db::list_orders(pool, filters, config.db_page_size).await?;
    let reconciler = Reconciler::new(local_store(&config.store_config()), Arc::new(DiscardSink));
    let unmapped = reconciler.unmapped(&orders);

    if unmapped.is_empty() {
        println!("no unmapped products in {} orders", orders.len());
        return Ok(());
    }

    println!("{:<7}{:<8}{:<12}NAME", "COUNT", "ORDERS", "LAST SEEN");
    for aggregate in unmapped.iter().take(limit) {
        println!(
            "{:<7}{:<8}{:<12}{}",
            aggregate.occurrences,
            aggregate.order_ids.len(),
            aggregate.last_seen.format("%Y-%m-%d"),
            display_name(&aggregate.name)
        );
    }
    if unmapped.len() > limit {
        println!("... {} more", unmapped.len() - limit);
    }
    Ok(())
}

/// Map an unmapped name onto a single inventory product.
///
/// # Errors
///
/// Returns an error if either name is blank or a dictionary URL is malformed.
pub(crate) async fn run_map(
    config: &StoreConfig,
    unmapped: &str,
    product: &str,
    quantity: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let session = Session::open(config, dry_run)?;
    let result = session.reconciler.map_to_product(unmapped, product, quantity);
    session.finish().await;

    let mapping = result?;
    let prefix = if dry_run { "dry-run: would map" } else { "mapped" };
    println!(
        "{prefix} {} -> {}",
        mapping.unmapped_name, mapping.mapped_product_name
    );
    Ok(())
}

pub(crate) fn run_mappings(config: &StoreConfig) {
    let mappings = local_store(config).mappings();
    if mappings.is_empty() {
        println!("no mappings saved in {}", config.store_dir.display());
        return;
    }
    println!("{:<12}{:<40}TARGET", "CREATED", "UNMAPPED");
    for mapping in &mappings {
        println!(
            "{:<12}{:<40}{}",
            mapping.created_at.format("%Y-%m-%d"),
            mapping.unmapped_name,
            mapping.mapped_product_name
        );
    }
}

pub(crate) fn run_combo_list(config: &StoreConfig) {
    let combos = local_store(config).combos();
    if combos.is_empty() {
        println!("no combos saved in {}", config.store_dir.display());
        return;
    }
    for combo in &combos {
        println!("{}  {}  [{}]", combo.id, combo.name, combo.items_summary());
    }
}

/// Save a combo, mapping `map_from` onto it when given.
///
/// # Errors
///
/// Returns an error if the combo fails validation or a dictionary URL is
/// malformed.
pub(crate) async fn run_combo_add(
    config: &StoreConfig,
    name: String,
    items: Vec<ComboItem>,
    map_from: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let draft = ComboDraft {
        id: None,
        name,
        items,
    };
    let session = Session::open(config, dry_run)?;
    let result = match map_from {
        Some(unmapped) => session
            .reconciler
            .map_to_combo(unmapped, draft)
            .map(|(combo, mapping)| (combo, Some(mapping))),
        None => session.reconciler.save_combo(draft).map(|combo| (combo, None)),
    };
    session.finish().await;

    let (combo, mapping) = result?;
    let prefix = if dry_run { "dry-run: would save" } else { "saved" };
    println!(
        "{prefix} combo {} ({}): {}",
        combo.id,
        combo.name,
        combo.items_summary()
    );
    if let Some(mapping) = mapping {
        println!("mapped {} -> {}", mapping.unmapped_name, combo.name);
    }
    Ok(())
}

/// Delete a combo and its mappings.
///
/// # Errors
///
/// Returns an error if no combo has the given id.
pub(crate) fn run_combo_delete(config: &StoreConfig, id: &str) -> anyhow::Result<()> {
    let deletion = local_store(config).delete_combo(id);
    if deletion.is_noop() {
        anyhow::bail!("combo '{id}' not found");
    }
    println!(
        "deleted combo {id} and {} mapping(s)",
        deletion.mappings_removed
    );
    Ok(())
}
