use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;
use webhub_careers::config::{AppConfig, StoreConfig};
use webhub_careers::error::AppError;
use webhub_careers::workflows::careers::{
    ApplicationRow, ApplicationStore, CareerApplicationService, DisabledStore, LettreMailer,
    StoreError, StoreProbe, SupabaseStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) backends: BackendSummary,
}

/// Backend labels surfaced by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BackendSummary {
    pub(crate) email: &'static str,
    pub(crate) store: &'static str,
}

/// Store selected from configuration at startup.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredStore {
    Supabase(SupabaseStore),
    Disabled(DisabledStore),
}

impl ConfiguredStore {
    pub(crate) fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match &config.supabase {
            Some(supabase) => Ok(Self::Supabase(SupabaseStore::new(supabase)?)),
            None => {
                warn!("SUPABASE_URL or SUPABASE_KEY not set; applications will not be recorded");
                Ok(Self::Disabled(DisabledStore))
            }
        }
    }
}

#[async_trait]
impl ApplicationStore for ConfiguredStore {
    async fn insert(&self, row: &ApplicationRow) -> Result<(), StoreError> {
        match self {
            Self::Supabase(store) => store.insert(row).await,
            Self::Disabled(store) => store.insert(row).await,
        }
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        match self {
            Self::Supabase(store) => store.probe().await,
            Self::Disabled(store) => store.probe().await,
        }
    }

    fn backend(&self) -> &'static str {
        match self {
            Self::Supabase(store) => store.backend(),
            Self::Disabled(store) => store.backend(),
        }
    }
}

pub(crate) type IntakeService = CareerApplicationService<LettreMailer, ConfiguredStore>;

pub(crate) fn build_service(config: &AppConfig) -> Result<IntakeService, AppError> {
    let mailer = LettreMailer::from_config(&config.mail)?;
    let store = ConfiguredStore::from_config(&config.store)?;
    Ok(CareerApplicationService::new(
        Arc::new(mailer),
        Arc::new(store),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_select_disabled_store() {
        let store = ConfiguredStore::from_config(&StoreConfig { supabase: None })
            .expect("store builds");

        assert_eq!(store.backend(), "disabled");
        assert!(matches!(store.probe().await, Err(StoreError::Unconfigured)));
    }
}
