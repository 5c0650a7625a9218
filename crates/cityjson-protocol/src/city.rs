//! City models and the city objects they own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::geometry::{Geometry, GeometryError, GeometryType};
use crate::queries::PredicateTarget;

/// A named, imported CityJSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityModel {
    /// Unique name, used as the collection id.
    pub name: String,

    /// Free-form metadata copied from the document.
    #[serde(default)]
    pub metadata: Value,
}

impl CityModel {
    pub fn new(name: impl Into<String>, metadata: Value) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }
}

/// A WGS84 point used to place a city object for spatial filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename = "Point")]
pub struct Location {
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            coordinates: [lon, lat],
        }
    }

    pub fn lon(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }
}

/// A city feature (Building, Tunnel, TunnelInstallation, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityObject {
    pub name: String,

    #[serde(rename = "type")]
    pub object_type: String,

    /// Owning city model name.
    #[serde(rename = "CityModel")]
    pub city_model: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default)]
    pub geometry: Vec<Geometry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Violations of the per-object-type rules.
#[derive(Debug, Error, PartialEq)]
pub enum CityObjectError {
    /// A geometry failed structural validation.
    #[error("Geometry {index} of '{object}' is invalid: {source}")]
    Geometry {
        object: String,
        index: usize,
        #[source]
        source: GeometryError,
    },

    /// The object type does not allow this geometry type.
    #[error("{object_type} '{object}' cannot carry {geometry_type} geometry")]
    GeometryTypeNotAllowed {
        object: String,
        object_type: String,
        geometry_type: GeometryType,
    },

    /// The raw city object is not a JSON object.
    #[error("City object '{object}' is not a JSON object")]
    NotAnObject { object: String },

    /// A required member is absent.
    #[error("City object '{object}' has no '{member}'")]
    MissingMember { object: String, member: &'static str },

    /// A member has the wrong JSON type.
    #[error("City object '{object}': '{member}' {reason}")]
    InvalidMember {
        object: String,
        member: &'static str,
        reason: String,
    },

    /// The object type needs at least one parent.
    #[error("{object_type} '{object}' requires a parent")]
    MissingParents { object: String, object_type: String },
}

/// Geometry types a tunnel or tunnel part may carry.
const TUNNEL_GEOMETRIES: &[GeometryType] = &[
    GeometryType::Solid,
    GeometryType::CompositeSolid,
    GeometryType::MultiSurface,
];

/// Object types that only exist as part of another object.
const REQUIRES_PARENTS: &[&str] = &["TunnelPart", "TunnelInstallation"];

fn allowed_geometries(object_type: &str) -> Option<&'static [GeometryType]> {
    match object_type {
        "Tunnel" | "TunnelPart" => Some(TUNNEL_GEOMETRIES),
        _ => None,
    }
}

impl CityObject {
    /// Build a city object from its raw CityJSON form.
    ///
    /// All geometries must validate; the first failure rejects the whole
    /// object.
    pub fn from_raw(city_model: &str, name: &str, raw: &Value) -> Result<Self, CityObjectError> {
        let raw = raw.as_object().ok_or_else(|| CityObjectError::NotAnObject {
            object: name.to_string(),
        })?;
        let invalid = |member: &'static str, reason: &str| CityObjectError::InvalidMember {
            object: name.to_string(),
            member,
            reason: reason.to_string(),
        };

        let object_type = match raw.get("type") {
            Some(Value::String(t)) if !t.is_empty() => t.clone(),
            Some(_) => return Err(invalid("type", "must be a non-empty string")),
            None => {
                return Err(CityObjectError::MissingMember {
                    object: name.to_string(),
                    member: "type",
                })
            }
        };

        let raw_geometry = match raw.get("geometry") {
            None => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(invalid("geometry", "must be an array")),
        };
        let geometry = raw_geometry
            .iter()
            .enumerate()
            .map(|(index, g)| {
                let mut geometry =
                    crate::geometry::validate(g).map_err(|source| CityObjectError::Geometry {
                        object: name.to_string(),
                        index,
                        source,
                    })?;
                geometry.set_owner(city_model, name);
                Ok(geometry)
            })
            .collect::<Result<Vec<_>, CityObjectError>>()?;

        let attributes = match raw.get("attributes") {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(invalid("attributes", "must be an object")),
        };

        let object = Self {
            name: name.to_string(),
            object_type,
            city_model: city_model.to_string(),
            parents: string_list(raw.get("parents")).map_err(|reason| invalid("parents", reason))?,
            children: string_list(raw.get("children")).map_err(|reason| invalid("children", reason))?,
            attributes,
            geometry,
            location: None,
        };
        object.check_type_rules()?;
        Ok(object)
    }

    /// Enforce the geometry and parent rules of the object type.
    pub fn check_type_rules(&self) -> Result<(), CityObjectError> {
        if let Some(allowed) = allowed_geometries(&self.object_type) {
            if let Some(bad) = self
                .geometry
                .iter()
                .map(Geometry::geometry_type)
                .find(|t| !allowed.contains(t))
            {
                return Err(CityObjectError::GeometryTypeNotAllowed {
                    object: self.name.clone(),
                    object_type: self.object_type.clone(),
                    geometry_type: bad,
                });
            }
        }

        if REQUIRES_PARENTS.contains(&self.object_type.as_str()) && self.parents.is_empty() {
            return Err(CityObjectError::MissingParents {
                object: self.name.clone(),
                object_type: self.object_type.clone(),
            });
        }

        Ok(())
    }

    /// Equality test used by attribute filters.
    ///
    /// `name` and `type` compare against the object itself, `attributes.<key>`
    /// and bare keys against the attribute map. Only string values match;
    /// there is no type coercion.
    pub fn matches_predicate(&self, key: &str, value: &str) -> bool {
        match PredicateTarget::of(key) {
            PredicateTarget::Name => self.name == value,
            PredicateTarget::Type => self.object_type == value,
            PredicateTarget::Attribute(key) => {
                matches!(self.attributes.get(key), Some(Value::String(s)) if s == value)
            }
        }
    }
}

fn string_list(value: Option<&Value>) -> Result<Vec<String>, &'static str> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    value
        .as_array()
        .ok_or("must be an array of object ids")?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or("must only hold string ids"))
        .collect()
}
