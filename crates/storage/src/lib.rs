//! Storage abstractions for the CityJSON features service.
//!
//! Provides one interface, [`FeatureStore`], with two backends:
//! - PostgreSQL, objects kept as JSONB with indexed type and location columns
//! - In-memory, for tests and small read-only deployments

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryFeatureStore;
pub use postgres::PgFeatureStore;
pub use store::{FeatureStore, StoreError, StoreResult};
