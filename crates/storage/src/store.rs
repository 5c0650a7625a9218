//! The storage interface shared by every backend.

use async_trait::async_trait;
use thiserror::Error;

use cityjson_protocol::{CityModel, CityObject, Filter, ImportedModel};

/// Errors raised by a feature store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend rejected or failed a query.
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored record no longer validates.
    #[error("Stored record is invalid: {0}")]
    Corrupt(String),

    /// An import targeted an existing model without asking to replace it.
    #[error("City model already exists: {0}")]
    ModelExists(String),
}

impl StoreError {
    /// Whether the failure is about reachability rather than the query.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read and import access to city models and their objects.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Short backend name for logs and readiness output.
    fn backend(&self) -> &'static str;

    /// All models, ordered by name.
    async fn list_models(&self) -> StoreResult<Vec<CityModel>>;

    async fn get_model(&self, name: &str) -> StoreResult<Option<CityModel>>;

    /// Objects matching `filter`, ordered by name, with the filter's
    /// offset and limit applied after every predicate.
    async fn query_objects(&self, filter: &Filter) -> StoreResult<Vec<CityObject>>;

    async fn get_object(&self, model: &str, name: &str) -> StoreResult<Option<CityObject>>;

    /// Write a model and all its objects atomically.
    ///
    /// With `replace` an existing model of the same name is dropped first,
    /// otherwise it is an error. Returns the number of objects written.
    async fn import_model(&self, imported: &ImportedModel, replace: bool) -> StoreResult<usize>;

    /// Check the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
