mod api;
mod middleware;

use std::sync::Arc;

use stockmap_reconcile::{DictionarySink, DiscardSink, FileBackend, LocalMappingStore, Reconciler};
use stockmap_webhook::{DictionaryEndpoints, DictionaryMirror, WebhookClient, DEFAULT_OUTBOX_CAPACITY};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = stockmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = stockmap_db::PoolConfig::from_app_config(&config);
    let pool = stockmap_db::connect_pool(&config.database_url, pool_config).await?;

    let webhook = WebhookClient::new(config.webhook_timeout_secs)?;
    let inventory_url = stockmap_webhook::parse_url(&config.inventory_webhook_url)?;
    let dictionary = DictionaryEndpoints::from_config(
        config.dictionary_webhook_url.as_deref(),
        config.combo_dictionary_webhook_url.as_deref(),
    )?;

    let mut mirror_task = None;
    let sink: Arc<dyn DictionarySink> = if dictionary.product.is_some() || dictionary.combo.is_some() {
        let (mirror, handle) =
            DictionaryMirror::spawn(webhook.clone(), dictionary.clone(), DEFAULT_OUTBOX_CAPACITY);
        mirror_task = Some(handle);
        Arc::new(mirror)
    } else {
        tracing::warn!("no dictionary webhook configured; saved mappings will not be mirrored");
        Arc::new(DiscardSink)
    };

    tracing::info!(store_dir = %config.store_dir.display(), "using local mapping store");
    let store = Arc::new(LocalMappingStore::new(FileBackend::new(config.store_dir.clone())));
    let reconciler = Reconciler::new(store, sink);

    let app = build_app(AppState {
        pool,
        reconciler,
        webhook,
        inventory_url,
        dictionary,
        default_operator: config.default_operator.clone(),
        low_stock_threshold: config.low_stock_threshold,
        page_size: config.db_page_size,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = ?config.env, "stockmap-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and its mirror sender) is gone; let queued entries drain.
    if let Some(handle) = mirror_task {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "dictionary mirror task ended abnormally");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
