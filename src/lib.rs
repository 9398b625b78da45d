pub mod core;
pub mod providers;
pub mod reader;
pub mod store;
pub mod updater;

pub use crate::core::{Error, StoreError};

use crate::core::config::AppConfig;
use crate::providers::EcbProvider;
use crate::reader::{ApiResponse, Reader};
use crate::updater::Updater;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

pub enum AppCommand {
    Update,
    Read,
}

/// Loads the config file (or defaults) and applies environment overrides.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    let config = config.with_env_overrides();
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Runs one update cycle against the configured source and table.
pub async fn update(config: &AppConfig) -> Result<()> {
    let source = EcbProvider::new(&config.source.url, config.source.timeout())?;
    let table = store::open_table(config)?;
    let updater = Updater::new(Arc::new(source), table, config.store.batch_size);
    updater.run().await?;
    Ok(())
}

/// Serves one read request; store failures become a 500 response.
pub async fn read(config: &AppConfig) -> ApiResponse {
    let table = match store::open_table(config) {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "Failed to open table");
            return ApiResponse::internal_error();
        }
    };

    let reader = Reader::new(table, config.store.page_size, &config.base_currency);
    match reader.run().await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Failed to read exchange rates");
            ApiResponse::internal_error()
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    match command {
        AppCommand::Update => {
            info!(url = %config.source.url, table = %config.store.table_name, "Update starting");
            update(&config).await
        }
        AppCommand::Read => {
            let response = read(&config).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if response.status_code >= 500 {
                anyhow::bail!("Read failed with status {}", response.status_code);
            }
            Ok(())
        }
    }
}
