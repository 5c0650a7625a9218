//! PostgreSQL feature store.
//!
//! Each city object is stored whole as JSONB in `body`, next to the columns
//! the items query filters on: type, attributes (GIN indexed) and the 2D
//! location.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use cityjson_protocol::{CityModel, CityObject, Filter, ImportedModel, PredicateTarget};

use crate::store::{FeatureStore, StoreError, StoreResult};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Connection(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Database connection pool and feature queries.
pub struct PgFeatureStore {
    pool: PgPool,
}

impl PgFeatureStore {
    /// Create a new store from a database URL.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(&self.pool).await?;
            }
        }

        Ok(())
    }
}

#[derive(FromRow)]
struct ModelRow {
    name: String,
    metadata: Value,
}

impl From<ModelRow> for CityModel {
    fn from(row: ModelRow) -> Self {
        CityModel::new(row.name, row.metadata)
    }
}

#[derive(FromRow)]
struct ObjectRow {
    body: Value,
}

impl TryFrom<ObjectRow> for CityObject {
    type Error = StoreError;

    /// Re-runs geometry validation on the stored body.
    fn try_from(row: ObjectRow) -> Result<Self, Self::Error> {
        serde_json::from_value(row.body).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

/// Build the paged items query for `filter`.
fn objects_query(filter: &Filter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new("SELECT body FROM city_objects WHERE city_model = ");
    query.push_bind(filter.collection_id.as_str());

    for (key, value) in &filter.equality_predicates {
        match PredicateTarget::of(key) {
            PredicateTarget::Name => {
                query.push(" AND name = ").push_bind(value.as_str());
            }
            PredicateTarget::Type => {
                query.push(" AND object_type = ").push_bind(value.as_str());
            }
            PredicateTarget::Attribute(attribute) => {
                // Containment only matches JSON strings, never numbers.
                query
                    .push(" AND attributes @> jsonb_build_object(")
                    .push_bind(attribute)
                    .push("::text, ")
                    .push_bind(value.as_str())
                    .push("::text)");
            }
        }
    }

    if let Some(polygon) = &filter.spatial_polygon {
        let [west, south, east, north] = polygon.envelope();
        query
            .push(" AND lon BETWEEN ")
            .push_bind(west)
            .push(" AND ")
            .push_bind(east)
            .push(" AND lat BETWEEN ")
            .push_bind(south)
            .push(" AND ")
            .push_bind(north);
    }

    query
        .push(" ORDER BY name LIMIT ")
        .push_bind(i64::from(filter.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(filter.offset));
    query
}

#[async_trait]
impl FeatureStore for PgFeatureStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_models(&self) -> StoreResult<Vec<CityModel>> {
        let rows = sqlx::query_as::<_, ModelRow>("SELECT name, metadata FROM city_models ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CityModel::from).collect())
    }

    async fn get_model(&self, name: &str) -> StoreResult<Option<CityModel>> {
        let row = sqlx::query_as::<_, ModelRow>("SELECT name, metadata FROM city_models WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CityModel::from))
    }

    async fn query_objects(&self, filter: &Filter) -> StoreResult<Vec<CityObject>> {
        let mut query = objects_query(filter);
        debug!(sql = query.sql(), "Querying city objects");

        let rows = query
            .build_query_as::<ObjectRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CityObject::try_from).collect()
    }

    async fn get_object(&self, model: &str, name: &str) -> StoreResult<Option<CityObject>> {
        let row = sqlx::query_as::<_, ObjectRow>(
            "SELECT body FROM city_objects WHERE city_model = $1 AND name = $2",
        )
        .bind(model)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CityObject::try_from).transpose()
    }

    async fn import_model(&self, imported: &ImportedModel, replace: bool) -> StoreResult<usize> {
        let name = &imported.model.name;
        let mut tx = self.pool.begin().await?;

        let exists: Option<(String,)> = sqlx::query_as("SELECT name FROM city_models WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_some() {
            if !replace {
                return Err(StoreError::ModelExists(name.clone()));
            }
            // Objects go with the model through ON DELETE CASCADE.
            sqlx::query("DELETE FROM city_models WHERE name = $1")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("INSERT INTO city_models (name, metadata) VALUES ($1, $2)")
            .bind(name)
            .bind(&imported.model.metadata)
            .execute(&mut *tx)
            .await?;

        for object in &imported.objects {
            let body = serde_json::to_value(object).map_err(|e| StoreError::Query(e.to_string()))?;
            let attributes = Value::Object(object.attributes.clone());

            sqlx::query(
                r#"
                INSERT INTO city_objects (
                    city_model, name, object_type, attributes, body, lon, lat
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(name)
            .bind(&object.name)
            .bind(&object.object_type)
            .bind(attributes)
            .bind(body)
            .bind(object.location.map(|l| l.lon()))
            .bind(object.location.map(|l| l.lat()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(model = %name, objects = imported.objects.len(), replace, "Imported city model");

        Ok(imported.objects.len())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS city_models (
    name TEXT PRIMARY KEY,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    imported_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS city_objects (
    city_model TEXT NOT NULL REFERENCES city_models(name) ON DELETE CASCADE,
    name TEXT NOT NULL,
    object_type TEXT NOT NULL,
    attributes JSONB NOT NULL DEFAULT '{}'::jsonb,
    body JSONB NOT NULL,
    lon DOUBLE PRECISION,
    lat DOUBLE PRECISION,

    PRIMARY KEY (city_model, name)
);

CREATE INDEX IF NOT EXISTS idx_city_objects_type ON city_objects(city_model, object_type);
CREATE INDEX IF NOT EXISTS idx_city_objects_location ON city_objects(lon, lat);
CREATE INDEX IF NOT EXISTS idx_city_objects_attributes ON city_objects USING GIN (attributes);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use cityjson_protocol::{build_filter, PagingLimits};

    fn filter(pairs: &[(&str, &str)]) -> Filter {
        let raw: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_filter(&raw, "Delft", &PagingLimits::default()).unwrap()
    }

    #[test]
    fn test_objects_query_defaults() {
        let f = filter(&[]);
        let query = objects_query(&f);
        assert_eq!(
            query.sql(),
            "SELECT body FROM city_objects WHERE city_model = $1 ORDER BY name LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_objects_query_predicates() {
        let f = filter(&[("type", "Building"), ("roofType", "flat")]);
        let query = objects_query(&f);

        // Predicates follow key order: roofType before type.
        assert_eq!(
            query.sql(),
            "SELECT body FROM city_objects WHERE city_model = $1 \
             AND attributes @> jsonb_build_object($2::text, $3::text) \
             AND object_type = $4 ORDER BY name LIMIT $5 OFFSET $6"
        );
    }

    #[test]
    fn test_objects_query_bbox() {
        let f = filter(&[("bbox", "4.3,51.9,4.4,52.05")]);
        let query = objects_query(&f);
        assert!(query
            .sql()
            .contains("AND lon BETWEEN $2 AND $3 AND lat BETWEEN $4 AND $5"));
    }

    #[test]
    fn test_connection_errors_are_unavailable() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_unavailable());

        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(!err.is_unavailable());
    }
}
