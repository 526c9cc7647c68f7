use crate::infra::ConfiguredStore;
use webhub_careers::config::AppConfig;
use webhub_careers::error::AppError;
use webhub_careers::workflows::careers::{ApplicationStore, StoreError, APPLICATIONS_TABLE_DDL};

/// Probes the configured store once and prints what it found.
pub(crate) async fn run_check_store() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = ConfiguredStore::from_config(&config.store)?;

    println!("Testing application store connection ({})...", store.backend());
    match store.probe().await {
        Ok(probe) => {
            println!("Store connection successful");
            match probe.row_count {
                Some(count) => println!("Table '{}' holds {count} applications", probe.table),
                None => println!("Table '{}' is reachable; row count unavailable", probe.table),
            }
            Ok(())
        }
        Err(StoreError::MissingTable(table)) => {
            println!("Table '{table}' does not exist yet. Create it with:\n");
            println!("{APPLICATIONS_TABLE_DDL}");
            Err(StoreError::MissingTable(table).into())
        }
        Err(err) => Err(err.into()),
    }
}
