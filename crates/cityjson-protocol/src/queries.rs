//! Query parameter parsing for the items endpoint.
//!
//! Turns the raw `?key=value` pairs of an items request into a validated
//! [`Filter`]: paging window, optional bounding-box polygon, and equality
//! predicates for every other key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::city::CityObject;

/// Parameters with a meaning of their own; everything else is an attribute filter.
pub const RESERVED_PARAMS: [&str; 5] = ["f", "limit", "offset", "bbox", "datetime"];

/// Errors raised while building a filter.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    /// A parameter has a malformed or out-of-range value.
    #[error("Invalid value for '{param}': {message}")]
    InvalidParameterValue { param: String, message: String },

    /// A parameter the service does not support.
    #[error("Parameter '{0}' is not supported")]
    UnsupportedParameter(String),

    /// A bbox with vertical bounds.
    #[error("Only 2D bounding boxes are supported by the spatial index")]
    Only2DSphereSupported,
}

impl QueryError {
    fn invalid(param: &str, message: impl Into<String>) -> Self {
        QueryError::InvalidParameterValue {
            param: param.to_string(),
            message: message.into(),
        }
    }
}

/// Paging bounds applied to `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingLimits {
    /// Used when `limit` is absent.
    pub default_limit: u32,

    /// Largest accepted `limit`.
    pub max_limit: u32,
}

impl Default for PagingLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 10_000,
        }
    }
}

/// A 2D bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BboxQuery {
    /// Western longitude.
    pub west: f64,

    /// Southern latitude.
    pub south: f64,

    /// Eastern longitude.
    pub east: f64,

    /// Northern latitude.
    pub north: f64,
}

impl BboxQuery {
    /// Parse a `bbox` parameter: `minLon,minLat,maxLon,maxLat`.
    ///
    /// Six numbers (a 3D box) are refused with
    /// [`QueryError::Only2DSphereSupported`]. Coordinates must lie strictly
    /// inside (-180, 180) and (-90, 90).
    pub fn parse(bbox: &str) -> Result<Self, QueryError> {
        let numbers = bbox
            .split(',')
            .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| QueryError::invalid("bbox", "Invalid bbox format"))?;

        let [west, south, east, north] = match numbers.len() {
            4 => [numbers[0], numbers[1], numbers[2], numbers[3]],
            6 => return Err(QueryError::Only2DSphereSupported),
            _ => return Err(QueryError::invalid("bbox", "Invalid bbox format")),
        };

        if west >= east || south >= north {
            return Err(QueryError::invalid(
                "bbox",
                "Invalid bbox format - min and max coordinates are not respected",
            ));
        }

        let checks = [
            (west, 180.0, "min longitude"),
            (south, 90.0, "min latitude"),
            (east, 180.0, "max longitude"),
            (north, 90.0, "max latitude"),
        ];
        for (value, bound, what) in checks {
            if !(value > -bound && value < bound) {
                return Err(QueryError::invalid(
                    "bbox",
                    format!("Invalid bbox format - {} problem", what),
                ));
            }
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Closed rectangular ring, first vertex repeated last.
    pub fn to_polygon(&self) -> Polygon {
        Polygon {
            ring: vec![
                [self.west, self.south],
                [self.west, self.north],
                [self.east, self.north],
                [self.east, self.south],
                [self.west, self.south],
            ],
        }
    }
}

/// A single-ring polygon, serialized as GeoJSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub ring: Vec<[f64; 2]>,
}

impl Polygon {
    /// `[west, south, east, north]` of the ring.
    pub fn envelope(&self) -> [f64; 4] {
        self.ring.iter().fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |[w, s, e, n], [x, y]| [w.min(*x), s.min(*y), e.max(*x), n.max(*y)],
        )
    }

    /// Whether a point lies within the polygon, boundary included.
    ///
    /// Filter polygons are always axis-aligned rectangles, so the envelope
    /// is exact.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        let [west, south, east, north] = self.envelope();
        (west..=east).contains(&lon) && (south..=north).contains(&lat)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename = "Polygon")]
struct GeoJsonPolygon {
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl Serialize for Polygon {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GeoJsonPolygon {
            coordinates: vec![self.ring.clone()],
        }
        .serialize(serializer)
    }
}

/// What an equality predicate key compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateTarget<'a> {
    /// The object name.
    Name,
    /// The object type.
    Type,
    /// A top-level attribute; `attributes.<key>` and bare `<key>` both land here.
    Attribute(&'a str),
}

impl<'a> PredicateTarget<'a> {
    pub fn of(key: &'a str) -> Self {
        match key {
            "name" => PredicateTarget::Name,
            "type" => PredicateTarget::Type,
            _ => PredicateTarget::Attribute(key.strip_prefix("attributes.").unwrap_or(key)),
        }
    }
}

/// A validated items query, handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    /// City model the items must belong to.
    pub collection_id: String,

    /// Attribute equality predicates from non-reserved parameters.
    pub equality_predicates: BTreeMap<String, String>,

    /// Items must lie within this polygon.
    pub spatial_polygon: Option<Polygon>,

    pub limit: u32,

    pub offset: u32,
}

impl Filter {
    /// A filter selecting everything in a collection, first page.
    pub fn for_collection(collection_id: impl Into<String>, limits: &PagingLimits) -> Self {
        Self {
            collection_id: collection_id.into(),
            equality_predicates: BTreeMap::new(),
            spatial_polygon: None,
            limit: limits.default_limit,
            offset: 0,
        }
    }

    /// Whether an object passes the collection, attribute and spatial tests.
    ///
    /// Paging is not applied here.
    pub fn matches(&self, object: &CityObject) -> bool {
        if object.city_model != self.collection_id {
            return false;
        }
        if !self
            .equality_predicates
            .iter()
            .all(|(k, v)| object.matches_predicate(k, v))
        {
            return false;
        }
        match (&self.spatial_polygon, &object.location) {
            (None, _) => true,
            (Some(polygon), Some(location)) => polygon.contains_point(location.lon(), location.lat()),
            (Some(_), None) => false,
        }
    }
}

/// Decode a raw query string into ordered key/value pairs.
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

/// Value of the first `key` pair, if any.
pub fn first_value<'a>(raw: &'a [(String, String)], key: &str) -> Option<&'a str> {
    raw.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn parse_integer(param: &str, value: &str) -> Result<i64, QueryError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| QueryError::invalid(param, format!("'{}' is not an integer", value)))
}

/// Build a filter from raw query pairs.
///
/// `datetime` is refused outright. `limit` must lie in
/// `[1, limits.max_limit]` and `offset` must be non-negative. For repeated
/// keys the first occurrence wins.
pub fn build_filter(
    raw: &[(String, String)],
    collection_id: &str,
    limits: &PagingLimits,
) -> Result<Filter, QueryError> {
    if first_value(raw, "datetime").is_some() {
        return Err(QueryError::UnsupportedParameter("datetime".to_string()));
    }

    let limit = match first_value(raw, "limit") {
        None => limits.default_limit,
        Some(value) => {
            let limit = parse_integer("limit", value)?;
            if limit < 1 || limit > i64::from(limits.max_limit) {
                return Err(QueryError::invalid(
                    "limit",
                    format!("{} is outside [1, {}]", limit, limits.max_limit),
                ));
            }
            limit as u32
        }
    };

    let offset = match first_value(raw, "offset") {
        None => 0,
        Some(value) => {
            let offset = parse_integer("offset", value)?;
            u32::try_from(offset)
                .map_err(|_| QueryError::invalid("offset", format!("{} is out of range", offset)))?
        }
    };

    let spatial_polygon = first_value(raw, "bbox")
        .map(|bbox| BboxQuery::parse(bbox).map(|b| b.to_polygon()))
        .transpose()?;

    let mut equality_predicates = BTreeMap::new();
    for (key, value) in raw {
        if !RESERVED_PARAMS.contains(&key.as_str()) {
            equality_predicates
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    Ok(Filter {
        collection_id: collection_id.to_string(),
        equality_predicates,
        spatial_polygon,
        limit,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_query() {
        let pairs = parse_query(Some("bbox=1%2C2%2C3%2C4&roofType=flat&f=json"));
        assert_eq!(
            pairs,
            params(&[("bbox", "1,2,3,4"), ("roofType", "flat"), ("f", "json")])
        );
        assert_eq!(first_value(&pairs, "f"), Some("json"));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_defaults() {
        let filter = build_filter(&[], "Delft", &PagingLimits::default()).unwrap();
        assert_eq!(filter.collection_id, "Delft");
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.offset, 0);
        assert!(filter.spatial_polygon.is_none());
        assert!(filter.equality_predicates.is_empty());
    }

    #[test]
    fn test_datetime_rejected() {
        let result = build_filter(
            &params(&[("datetime", "2018-02-12T23:20:50Z")]),
            "Delft",
            &PagingLimits::default(),
        );
        assert_eq!(
            result,
            Err(QueryError::UnsupportedParameter("datetime".into()))
        );
    }

    #[test]
    fn test_limit_bounds() {
        let limits = PagingLimits::default();
        for bad in ["0", "-5", "10001", "abc", "2.5"] {
            let result = build_filter(&params(&[("limit", bad)]), "Delft", &limits);
            assert!(
                matches!(result, Err(QueryError::InvalidParameterValue { ref param, .. }) if param == "limit"),
                "limit={} should be rejected",
                bad
            );
        }
        let filter = build_filter(&params(&[("limit", "10000")]), "Delft", &limits).unwrap();
        assert_eq!(filter.limit, 10_000);
    }

    #[test]
    fn test_offset() {
        let limits = PagingLimits::default();
        let filter = build_filter(&params(&[("offset", "20")]), "Delft", &limits).unwrap();
        assert_eq!(filter.offset, 20);

        assert!(build_filter(&params(&[("offset", "-1")]), "Delft", &limits).is_err());
    }

    #[test]
    fn test_equality_predicates() {
        let filter = build_filter(
            &params(&[
                ("f", "json"),
                ("type", "Building"),
                ("roofType", "flat"),
                ("roofType", "gabled"),
            ]),
            "Delft",
            &PagingLimits::default(),
        )
        .unwrap();

        assert_eq!(filter.equality_predicates.len(), 2);
        assert_eq!(filter.equality_predicates["type"], "Building");
        assert_eq!(filter.equality_predicates["roofType"], "flat");
    }

    #[test]
    fn test_predicate_targets() {
        assert_eq!(PredicateTarget::of("name"), PredicateTarget::Name);
        assert_eq!(PredicateTarget::of("type"), PredicateTarget::Type);
        assert_eq!(PredicateTarget::of("roofType"), PredicateTarget::Attribute("roofType"));
        assert_eq!(
            PredicateTarget::of("attributes.roofType"),
            PredicateTarget::Attribute("roofType")
        );
    }

    #[test]
    fn test_bbox_polygon() {
        let bbox = BboxQuery::parse("10,10,20,20").unwrap();
        let polygon = bbox.to_polygon();
        assert_eq!(polygon.ring.len(), 5);
        assert_eq!(polygon.ring.first(), polygon.ring.last());
        assert_eq!(
            polygon.ring,
            vec![[10.0, 10.0], [10.0, 20.0], [20.0, 20.0], [20.0, 10.0], [10.0, 10.0]]
        );
        assert!(polygon.contains_point(15.0, 15.0));
        assert!(polygon.contains_point(10.0, 20.0));
        assert!(!polygon.contains_point(21.0, 15.0));
    }

    #[test]
    fn test_bbox_errors() {
        let message = |s: &str| match BboxQuery::parse(s) {
            Err(QueryError::InvalidParameterValue { message, .. }) => message,
            other => panic!("expected invalid value for {}, got {:?}", s, other),
        };

        assert!(message("-200,10,-100,20").contains("min longitude"));
        assert!(message("10,10,5,20").contains("min and max"));
        assert!(message("10,-90,20,20").contains("min latitude"));
        assert!(message("10,10,180,20").contains("max longitude"));
        assert!(message("10,10,20,90").contains("max latitude"));
        assert!(message("10,10,20").contains("Invalid bbox format"));
        assert!(message("a,b,c,d").contains("Invalid bbox format"));

        assert_eq!(
            BboxQuery::parse("10,10,0,20,20,100"),
            Err(QueryError::Only2DSphereSupported)
        );
    }

    #[test]
    fn test_polygon_serializes_as_geojson() {
        let polygon = BboxQuery::parse("1,2,3,4").unwrap().to_polygon();
        let json = serde_json::to_value(&polygon).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["coordinates"][0].as_array().unwrap().len(), 5);
    }
}
