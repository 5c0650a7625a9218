//! CityJSON over OGC API - Features
//!
//! This crate provides the core of a Features API serving CityJSON city
//! models: geometry validation, the city model domain, document import,
//! items query parsing and the response envelopes.
//!
//! # Conformance Classes
//!
//! - Core
//! - HTML
//! - OpenAPI 3.0
//! - GeoJSON
//!
//! # Example
//!
//! ```rust
//! use cityjson_protocol::{build_filter, PagingLimits};
//!
//! let params = vec![("bbox".to_string(), "4.3,51.9,4.4,52.1".to_string())];
//! let filter = build_filter(&params, "Delft", &PagingLimits::default()).unwrap();
//! assert!(filter.spatial_polygon.is_some());
//! ```

pub mod types;
pub mod geometry;
pub mod city;
pub mod import;
pub mod queries;
pub mod collections;
pub mod links;
pub mod negotiation;
pub mod render;
pub mod responses;
pub mod errors;

// Re-export commonly used types
pub use types::{Link, Extent, SpatialExtent, CRS84};
pub use geometry::{shape_of, validate, Geometry, GeometryError, GeometryType, NestingSpec};
pub use city::{CityModel, CityObject, CityObjectError, Location};
pub use import::{import_document, model_name_for_file, ImportError, ImportedModel};
pub use queries::{build_filter, parse_query, BboxQuery, Filter, PagingLimits, Polygon, PredicateTarget, QueryError};
pub use collections::{CollectionList, CollectionSummary, ItemCollection, ItemResponse};
pub use negotiation::{negotiate, OutputFormat};
pub use render::{render, BasicHtmlRenderer, RenderKind, RenderedBody, ViewRenderer};
pub use responses::{LandingPage, ConformanceClasses, ErrorEnvelope};
pub use errors::FeaturesError;

/// OGC API - Features conformance class URIs
pub mod conformance {
    /// Core conformance class
    pub const CORE: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core";
    /// HTML encoding conformance class
    pub const HTML: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/html";
    /// OpenAPI 3.0 conformance class
    pub const OAS30: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/oas30";
    /// GeoJSON encoding conformance class
    pub const GEOJSON: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/geojson";
}

/// Media types used in responses
pub mod media_types {
    /// JSON media type
    pub const JSON: &str = "application/json";
    /// GeoJSON media type, accepted as JSON
    pub const GEO_JSON: &str = "application/geo+json";
    /// HTML media type
    pub const HTML: &str = "text/html";
}
