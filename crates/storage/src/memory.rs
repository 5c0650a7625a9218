//! In-memory feature store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use cityjson_protocol::{CityModel, CityObject, Filter, ImportedModel};

use crate::store::{FeatureStore, StoreError, StoreResult};

struct StoredModel {
    model: CityModel,
    /// Keyed by object name, which gives name ordering for free.
    objects: BTreeMap<String, CityObject>,
}

/// Feature store backed by process memory.
#[derive(Default)]
pub struct MemoryFeatureStore {
    models: RwLock<BTreeMap<String, StoredModel>>,
}

impl MemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeatureStore for MemoryFeatureStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_models(&self) -> StoreResult<Vec<CityModel>> {
        let models = self.models.read().await;
        Ok(models.values().map(|m| m.model.clone()).collect())
    }

    async fn get_model(&self, name: &str) -> StoreResult<Option<CityModel>> {
        let models = self.models.read().await;
        Ok(models.get(name).map(|m| m.model.clone()))
    }

    async fn query_objects(&self, filter: &Filter) -> StoreResult<Vec<CityObject>> {
        let models = self.models.read().await;
        let Some(stored) = models.get(&filter.collection_id) else {
            return Ok(Vec::new());
        };

        Ok(stored
            .objects
            .values()
            .filter(|o| filter.matches(o))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_object(&self, model: &str, name: &str) -> StoreResult<Option<CityObject>> {
        let models = self.models.read().await;
        Ok(models.get(model).and_then(|m| m.objects.get(name)).cloned())
    }

    async fn import_model(&self, imported: &ImportedModel, replace: bool) -> StoreResult<usize> {
        let name = &imported.model.name;
        let mut models = self.models.write().await;

        if models.contains_key(name) && !replace {
            return Err(StoreError::ModelExists(name.clone()));
        }

        let objects: BTreeMap<String, CityObject> = imported
            .objects
            .iter()
            .map(|o| (o.name.clone(), o.clone()))
            .collect();
        let count = objects.len();

        models.insert(
            name.clone(),
            StoredModel {
                model: imported.model.clone(),
                objects,
            },
        );
        debug!(model = %name, objects = count, "Stored city model in memory");

        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
