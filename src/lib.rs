pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands the application can run once configuration is loaded. The clap
/// layer in `main.rs` maps its subcommands onto this enum so the library
/// surface stays CLI-framework-free.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Originate {
        property_id: String,
        occupant_id: String,
        address: Option<String>,
    },
    Status {
        property_id: Option<String>,
    },
    Issue {
        property_id: String,
        investor_id: String,
        amount_percent: f64,
    },
    Transfer {
        property_id: String,
        buyer_id: String,
        seller_id: String,
        amount_percent: f64,
    },
    Sync {
        property_id: Option<String>,
    },
    Dues {
        property_id: String,
    },
    Shares {
        property_id: String,
        investor_id: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Stakehouse starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_default(&config)?;

    let valuation_cache = Arc::new(Cache::<String, f64>::new());
    let base_url = config
        .providers
        .warehouse
        .as_ref()
        .map_or(providers::warehouse::DEFAULT_WAREHOUSE_URL, |p| {
            p.base_url.as_str()
        });
    let provider = providers::warehouse::WarehouseProvider::new(base_url, valuation_cache);

    match command {
        AppCommand::Originate {
            property_id,
            occupant_id,
            address,
        } => {
            cli::originate::run(
                &config,
                &store,
                &provider,
                &property_id,
                &occupant_id,
                address.as_deref(),
            )
            .await
        }
        AppCommand::Status { property_id } => cli::status::run(&store, property_id.as_deref()),
        AppCommand::Issue {
            property_id,
            investor_id,
            amount_percent,
        } => cli::transfer::run_issue(&store, &property_id, &investor_id, amount_percent),
        AppCommand::Transfer {
            property_id,
            buyer_id,
            seller_id,
            amount_percent,
        } => cli::transfer::run_transfer(
            &store,
            &property_id,
            &buyer_id,
            &seller_id,
            amount_percent,
        ),
        AppCommand::Sync { property_id } => {
            cli::sync::run(&store, &provider, property_id.as_deref()).await
        }
        AppCommand::Dues { property_id } => cli::dues::run(&store, &property_id),
        AppCommand::Shares {
            property_id,
            investor_id,
        } => cli::shares::run(&store, &property_id, investor_id.as_deref()),
    }
}
