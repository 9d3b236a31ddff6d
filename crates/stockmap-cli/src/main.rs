mod reconcile;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use stockmap_core::ComboItem;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stockmap-cli")]
#[command(about = "Inventory reconciliation command line interface")]
struct Cli {
    /// Directory holding the mapping store (overrides `STOCKMAP_STORE_DIR`)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Split an order product string into tokens
    Parse {
        /// Raw product text, e.g. "2 X GEL, (1 X Kit Barba)"
        text: String,
    },
    /// List unmapped order products, most frequent first
    Unmapped {
        /// Filter orders by store (substring)
        #[arg(long)]
        store: Option<String>,
        /// Earliest order date (inclusive)
        #[arg(long, value_parser = parse_date)]
        from: Option<DateTime<Utc>>,
        /// Latest order date (inclusive)
        #[arg(long, value_parser = parse_date)]
        to: Option<DateTime<Utc>>,
        /// Maximum number of rows to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Map an unmapped product onto one inventory product
    Map {
        /// Unmapped name as shown by `unmapped`, e.g. "(1 X Gel Pyton)"
        #[arg(long)]
        unmapped: String,
        /// Inventory product name
        #[arg(long)]
        product: String,
        /// Units of the product per unmapped unit
        #[arg(long)]
        quantity: Option<u32>,
        /// Validate and print without saving or notifying the dictionary
        #[arg(long)]
        dry_run: bool,
    },
    /// Show saved mappings
    Mappings,
    /// Manage product combos
    Combo {
        #[command(subcommand)]
        command: ComboCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
}

#[derive(Debug, Subcommand)]
enum ComboCommands {
    /// Show saved combos
    List,
    /// Save a combo, optionally mapping an unmapped product onto it
    Add {
        /// Combo name
        #[arg(long)]
        name: String,
        /// Member as "<qty> X <product>"; repeat for each member
        #[arg(long = "item", required = true, value_parser = parse_combo_item)]
        items: Vec<ComboItem>,
        /// Unmapped name to map onto the new combo
        #[arg(long)]
        map: Option<String>,
        /// Validate and print without saving or notifying the dictionary
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete a combo and every mapping pointing at it
    Delete {
        /// Combo id
        id: String,
    },
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    stockmap_db::parse_timestamp_str(raw).ok_or_else(|| format!("not a date or timestamp: '{raw}'"))
}

/// Parses `"2 X GEL PYTHON"` (quantity optional, defaults to 1).
fn parse_combo_item(raw: &str) -> Result<ComboItem, String> {
    let tokens = stockmap_reconcile::parse_product_tokens(raw);
    match tokens.as_slice() {
        [token] if !token.is_unmapped => Ok(ComboItem {
            product_name: token.name.clone(),
            quantity: token.effective_quantity(),
        }),
        _ => Err(format!(
            "expected a single \"<qty> X <product>\" item, got '{raw}'"
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("stockmap-cli: run with --help to list commands");
        return Ok(());
    };

    if let Commands::Parse { text } = &command {
        reconcile::run_parse(text);
        return Ok(());
    }

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => run_db_ping(&app_config(cli.store_dir)?).await,
        Commands::Parse { .. } => Ok(()),
        Commands::Unmapped {
            store,
            from,
            to,
            limit,
        } => {
            let config = app_config(cli.store_dir)?;
            let pool = connect(&config).await?;
            reconcile::run_unmapped(
                &pool,
                &config,
                stockmap_db::OrderFilters {
                    store: store.as_deref(),
                    from,
                    to,
                    limit: None,
                },
                limit,
            )
            .await
        }
        Commands::Map {
            unmapped,
            product,
            quantity,
            dry_run,
        } => {
            let config = store_config(cli.store_dir)?;
            reconcile::run_map(&config, &unmapped, &product, quantity, dry_run).await
        }
        Commands::Mappings => {
            reconcile::run_mappings(&store_config(cli.store_dir)?);
            Ok(())
        }
        Commands::Combo { command } => {
            let config = store_config(cli.store_dir)?;
            match command {
                ComboCommands::List => {
                    reconcile::run_combo_list(&config);
                    Ok(())
                }
                ComboCommands::Add {
                    name,
                    items,
                    map,
                    dry_run,
                } => reconcile::run_combo_add(&config, name, items, map.as_deref(), dry_run).await,
                ComboCommands::Delete { id } => reconcile::run_combo_delete(&config, &id),
            }
        }
    }
}

/// Full settings, for commands that reach the database.
fn app_config(store_dir: Option<PathBuf>) -> anyhow::Result<stockmap_core::AppConfig> {
    let mut config = stockmap_core::load_app_config()?;
    if let Some(dir) = store_dir {
        config.store_dir = dir;
    }
    Ok(config)
}

/// Store-only settings; no database or inventory webhook needed.
fn store_config(store_dir: Option<PathBuf>) -> anyhow::Result<stockmap_core::StoreConfig> {
    let mut config = stockmap_core::load_store_config()?;
    if let Some(dir) = store_dir {
        config.store_dir = dir;
    }
    Ok(config)
}

async fn connect(config: &stockmap_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = stockmap_db::PoolConfig::from_app_config(config);
    Ok(stockmap_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn run_db_ping(config: &stockmap_core::AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    stockmap_db::health_check(&pool).await?;
    println!("database ok");
    Ok(())
}
