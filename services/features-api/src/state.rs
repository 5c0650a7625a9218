//! Application state for the Features API.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use cityjson_protocol::{
    import_document, model_name_for_file, BasicHtmlRenderer, FeaturesError, ViewRenderer,
};
use metrics::histogram;
use metrics_exporter_prometheus::PrometheusHandle;
use storage::{FeatureStore, MemoryFeatureStore, PgFeatureStore, StoreResult};
use tracing::{error, info};

use crate::config::{ServiceConfig, StorageBackend};

/// Shared application state.
pub struct AppState {
    /// Feature store for models and objects.
    pub store: Arc<dyn FeatureStore>,

    pub config: ServiceConfig,

    /// HTML view of the payloads.
    pub renderer: Arc<dyn ViewRenderer>,

    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState, connecting the configured store.
    pub async fn new(config: ServiceConfig, metrics: Option<PrometheusHandle>) -> Result<Self> {
        let store: Arc<dyn FeatureStore> = match config.storage.backend {
            StorageBackend::Postgres => {
                let store = PgFeatureStore::connect(
                    &config.storage.database_url,
                    config.storage.max_connections,
                    config.query_timeout(),
                )
                .await
                .context("Failed to connect to PostgreSQL")?;
                store.migrate().await.context("Failed to run migrations")?;
                Arc::new(store)
            }
            StorageBackend::Memory => {
                let store = MemoryFeatureStore::new();
                for path in &config.storage.seed_files {
                    seed(&store, path).await?;
                }
                Arc::new(store)
            }
        };

        info!(backend = store.backend(), "Feature store ready");

        let mut state = Self::with_store(config, store);
        state.metrics = metrics;
        Ok(state)
    }

    /// Build state around an existing store.
    pub fn with_store(config: ServiceConfig, store: Arc<dyn FeatureStore>) -> Self {
        Self {
            store,
            config,
            renderer: Arc::new(BasicHtmlRenderer),
            metrics: None,
        }
    }

    /// Run a storage call under the configured timeout.
    ///
    /// Timeouts and connection failures become `StorageUnavailable`, every
    /// other store error `StorageFault`.
    pub async fn storage<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Result<T, FeaturesError> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.config.query_timeout(), call).await;
        histogram!("features_storage_query_seconds", "operation" => operation)
            .record(started.elapsed().as_secs_f64());

        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_unavailable() => {
                error!(operation, error = %e, "Storage unavailable");
                Err(FeaturesError::StorageUnavailable(e.to_string()))
            }
            Ok(Err(e)) => {
                error!(operation, error = %e, "Storage query failed");
                Err(FeaturesError::StorageFault(e.to_string()))
            }
            Err(_) => {
                error!(operation, timeout_secs = self.config.query_timeout_secs, "Storage call timed out");
                Err(FeaturesError::StorageUnavailable(format!(
                    "{} timed out after {}s",
                    operation, self.config.query_timeout_secs
                )))
            }
        }
    }
}

/// Import one CityJSON file into the memory store, named after its file stem.
async fn seed(store: &MemoryFeatureStore, path: &std::path::Path) -> Result<()> {
    let name = model_name_for_file(path)
        .with_context(|| format!("Cannot derive a model name from seed file {:?}", path))?;

    let content =
        std::fs::read(path).with_context(|| format!("Failed to read seed file: {:?}", path))?;
    let document: serde_json::Value = serde_json::from_slice(&content)
        .with_context(|| format!("Failed to parse seed file: {:?}", path))?;
    let imported = import_document(name, &document)
        .with_context(|| format!("Invalid CityJSON in {:?}", path))?;

    let count = store.import_model(&imported, true).await?;
    info!(model = %name, objects = count, "Seeded city model");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cityjson_protocol::{CityModel, CityObject, Filter, ImportedModel};
    use storage::StoreError;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// Store whose every call hangs or fails, for error mapping tests.
    struct BrokenStore {
        hang: bool,
    }

    #[async_trait]
    impl FeatureStore for BrokenStore {
        fn backend(&self) -> &'static str {
            "broken"
        }

        async fn list_models(&self) -> StoreResult<Vec<CityModel>> {
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Err(StoreError::Connection("refused".into()))
        }

        async fn get_model(&self, _name: &str) -> StoreResult<Option<CityModel>> {
            Err(StoreError::Query("syntax error".into()))
        }

        async fn query_objects(&self, _filter: &Filter) -> StoreResult<Vec<CityObject>> {
            Err(StoreError::Corrupt("bad body".into()))
        }

        async fn get_object(&self, _model: &str, _name: &str) -> StoreResult<Option<CityObject>> {
            Ok(None)
        }

        async fn import_model(&self, _imported: &ImportedModel, _replace: bool) -> StoreResult<usize> {
            Ok(0)
        }

        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Connection("refused".into()))
        }
    }

    fn state(hang: bool) -> AppState {
        let mut config = ServiceConfig::default();
        config.query_timeout_secs = 1;
        AppState::with_store(config, Arc::new(BrokenStore { hang }))
    }

    #[tokio::test]
    async fn test_connection_error_is_unavailable() {
        let state = state(false);
        let err = assert_err!(state.storage("list_models", state.store.list_models()).await);
        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn test_query_error_is_fault() {
        let state = state(false);
        let err = assert_err!(state.storage("get_model", state.store.get_model("Delft")).await);
        assert_eq!(err.code(), "StorageFault");
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let state = state(true);
        let err = state
            .storage("list_models", state.store.list_models())
            .await
            .unwrap_err();
        assert!(matches!(err, FeaturesError::StorageUnavailable(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn test_seed_memory_store() {
        let dir = test_utils::temp_test_dir();
        let path = test_utils::write_fixture(&dir, "Delft.city.json", &test_utils::delft_document());

        let mut config = ServiceConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.seed_files = vec![path];

        let state = assert_ok!(AppState::new(config, None).await);
        let models = assert_ok!(state.store.list_models().await);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "Delft");
    }

    #[tokio::test]
    async fn test_seed_file_without_stem_fails() {
        let dir = test_utils::temp_test_dir();
        let path = test_utils::write_fixture(&dir, ".json", &test_utils::delft_document());

        let mut config = ServiceConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.seed_files = vec![path];

        match AppState::new(config, None).await {
            Ok(_) => panic!("a seed file without a stem must be rejected"),
            Err(err) => assert!(err.to_string().contains("Cannot derive a model name")),
        }
    }
}
