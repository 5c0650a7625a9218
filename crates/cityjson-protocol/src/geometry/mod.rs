//! CityJSON geometry model.
//!
//! A geometry is either *shaped* (one of the array-nested primitives whose
//! nesting depth is fixed by its type, see [`registry`]) or a
//! [`GeometryInstance`] referencing a shared template.
//!
//! Values of these types only come out of [`validate`], including when they
//! are deserialized, so a `Geometry` in hand is always structurally sound.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use thiserror::Error;

pub mod registry;
pub mod validate;

pub use registry::{shape_of, GeometryType, NestingSpec};
pub use validate::validate;

/// Structural errors raised while validating a raw geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// The geometry is not a JSON object.
    #[error("Geometry must be a JSON object")]
    NotAnObject,

    /// A required member is absent.
    #[error("Missing required member '{0}'")]
    MissingMember(&'static str),

    /// A member has the wrong JSON type.
    #[error("Invalid member '{member}': {reason}")]
    InvalidMember { member: &'static str, reason: String },

    /// The `type` tag is not a CityJSON geometry type.
    #[error("Unknown geometry type: {0}")]
    UnknownGeometryType(String),

    /// The level of detail does not match the LoD pattern.
    #[error("Invalid LoD: {0}")]
    InvalidLod(String),

    /// `boundaries` is nested deeper or shallower than the type requires.
    #[error("Boundary depth mismatch: expected {expected}, found {actual}")]
    BoundaryDepthMismatch { expected: usize, actual: usize },

    /// A boundary leaf is not a non-negative integer.
    #[error("Boundary elements must be non-negative integers, found {0}")]
    BoundaryElementTypeError(String),

    /// A member the geometry type does not carry.
    #[error("'{member}' is not permitted on {geometry_type} geometries")]
    MemberNotPermitted {
        member: &'static str,
        geometry_type: GeometryType,
    },

    /// Malformed semantic surfaces or semantic values.
    #[error("Invalid semantics: {0}")]
    InvalidSemantics(String),

    /// A `values` array is nested to the wrong depth.
    #[error("{member} values depth mismatch: expected {expected}, found {actual}")]
    ValuesDepthMismatch {
        member: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A semantic index points past the end of `surfaces`.
    #[error("Semantic surface index {index} out of range ({surfaces} surfaces)")]
    SemanticsIndexOutOfRange { index: u32, surfaces: usize },

    /// Malformed material or texture theme.
    #[error("Invalid appearance: {0}")]
    InvalidAppearance(String),

    /// `transformationMatrix` is empty, not numeric, or not a stack of 4x4 matrices.
    #[error("Invalid transformation matrix: {0}")]
    InvalidTransformationMatrix(String),

    /// `template` is not a non-negative integer.
    #[error("Invalid template reference: {0}")]
    InvalidTemplate(String),
}

/// An array nested to a fixed depth, with leaves of type `T`.
///
/// Depth is not encoded in the type; the validator guarantees it matches
/// the registry entry of the owning geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Nested<T> {
    Leaf(T),
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Nesting depth, measured along the deepest branch.
    pub fn depth(&self) -> usize {
        match self {
            Nested::Leaf(_) => 0,
            Nested::List(items) => 1 + items.iter().map(Nested::depth).max().unwrap_or(0),
        }
    }

    /// Visit every leaf in document order.
    pub fn for_each_leaf<F: FnMut(&T)>(&self, f: &mut F) {
        match self {
            Nested::Leaf(v) => f(v),
            Nested::List(items) => items.iter().for_each(|item| item.for_each_leaf(f)),
        }
    }

    /// Visit every leaf, stopping at the first error.
    pub fn try_for_each_leaf<E, F>(&self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&T) -> Result<(), E>,
    {
        match self {
            Nested::Leaf(v) => f(v),
            Nested::List(items) => items.iter().try_for_each(|item| item.try_for_each_leaf(f)),
        }
    }
}

/// Level of detail, e.g. `2` or `"2.2"`.
///
/// Keeps whether it arrived as a JSON number or string so that it is
/// written back the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct Lod {
    text: String,
    numeric: bool,
}

impl Lod {
    /// Parse a LoD from a string, checking the LoD pattern.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        if !validate::is_valid_lod(text) {
            return Err(GeometryError::InvalidLod(text.to_string()));
        }
        Ok(Self {
            text: text.to_string(),
            numeric: false,
        })
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, GeometryError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => {
                let mut lod = Self::parse(&n.to_string())?;
                lod.numeric = true;
                Ok(lod)
            }
            other => Err(GeometryError::InvalidLod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Serialize for Lod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.numeric {
            if let Ok(number) = Number::from_str(&self.text) {
                return number.serialize(serializer);
            }
        }
        serializer.serialize_str(&self.text)
    }
}

/// A semantic surface classification (wall, roof, door, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticSurface {
    #[serde(rename = "type")]
    pub surface_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<u32>>,

    /// Any further attributes of the surface (slope, colour, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Semantic surfaces and the per-primitive index into them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Semantics {
    pub surfaces: Vec<SemanticSurface>,
    pub values: Nested<Option<u32>>,
}

/// One material theme: either per-surface `values` or a single `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialTheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Nested<Option<u32>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

/// One texture theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureTheme {
    pub values: Nested<Option<u32>>,
}

/// An array-nested CityJSON geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapedGeometry {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,

    #[serde(rename = "CityModel", skip_serializing_if = "Option::is_none")]
    pub city_model: Option<String>,

    #[serde(rename = "CityObject", skip_serializing_if = "Option::is_none")]
    pub city_object: Option<String>,

    pub lod: Lod,

    pub boundaries: Nested<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantics: Option<Semantics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<BTreeMap<String, MaterialTheme>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<BTreeMap<String, TextureTheme>>,
}

/// A placed copy of a template geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryInstance {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,

    #[serde(rename = "CityModel", skip_serializing_if = "Option::is_none")]
    pub city_model: Option<String>,

    #[serde(rename = "CityObject", skip_serializing_if = "Option::is_none")]
    pub city_object: Option<String>,

    /// Index into the shared template geometry list.
    pub template: u32,

    /// Anchor point vertex indices.
    pub boundaries: Vec<u32>,

    /// Stack of row-major 4x4 matrices, kept as written.
    #[serde(rename = "transformationMatrix")]
    pub transformation_matrix: Vec<Number>,
}

impl GeometryInstance {
    /// The transformation as 4x4 row-major matrices.
    pub fn matrices(&self) -> Vec<[f64; 16]> {
        self.transformation_matrix
            .chunks_exact(16)
            .map(|chunk| {
                let mut m = [0.0; 16];
                for (slot, n) in m.iter_mut().zip(chunk) {
                    *slot = n.as_f64().unwrap_or_default();
                }
                m
            })
            .collect()
    }
}

/// A validated CityJSON geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Geometry {
    Shaped(ShapedGeometry),
    Instance(GeometryInstance),
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Shaped(g) => g.geometry_type,
            Geometry::Instance(g) => g.geometry_type,
        }
    }

    /// Stamp the owning model and object names.
    pub fn set_owner(&mut self, city_model: &str, city_object: &str) {
        let (model, object) = match self {
            Geometry::Shaped(g) => (&mut g.city_model, &mut g.city_object),
            Geometry::Instance(g) => (&mut g.city_model, &mut g.city_object),
        };
        *model = Some(city_model.to_string());
        *object = Some(city_object.to_string());
    }

    /// Every vertex index referenced by the boundaries, in document order.
    pub fn vertex_indices(&self) -> Vec<u32> {
        match self {
            Geometry::Shaped(g) => {
                let mut indices = Vec::new();
                g.boundaries.for_each_leaf(&mut |i| indices.push(*i));
                indices
            }
            Geometry::Instance(g) => g.boundaries.clone(),
        }
    }
}

impl TryFrom<Value> for Geometry {
    type Error = GeometryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate(&value)
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        validate(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_depth() {
        let nested: Nested<u32> = Nested::List(vec![
            Nested::List(vec![Nested::Leaf(0), Nested::Leaf(1)]),
            Nested::List(vec![]),
        ]);
        assert_eq!(nested.depth(), 2);
        assert_eq!(Nested::<u32>::List(vec![]).depth(), 1);
    }

    #[test]
    fn test_nested_serializes_as_plain_arrays() {
        let nested: Nested<Option<u32>> = Nested::List(vec![
            Nested::Leaf(Some(0)),
            Nested::Leaf(None),
            Nested::Leaf(Some(2)),
        ]);
        assert_eq!(serde_json::to_value(&nested).unwrap(), json!([0, null, 2]));
    }

    #[test]
    fn test_lod_keeps_representation() {
        let lod = Lod::from_value(&json!(2)).unwrap();
        assert_eq!(serde_json::to_value(&lod).unwrap(), json!(2));

        let lod = Lod::from_value(&json!("2.2")).unwrap();
        assert_eq!(serde_json::to_value(&lod).unwrap(), json!("2.2"));
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let ok: Geometry = serde_json::from_value(json!({
            "type": "MultiPoint",
            "lod": "1",
            "boundaries": [0, 1, 2]
        }))
        .unwrap();
        assert_eq!(ok.geometry_type(), GeometryType::MultiPoint);

        let bad = serde_json::from_value::<Geometry>(json!({
            "type": "MultiPoint",
            "lod": "1",
            "boundaries": [[0, 1, 2]]
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_set_owner() {
        let mut geometry = validate(&json!({
            "type": "MultiLineString",
            "lod": 1,
            "boundaries": [[0, 1], [1, 2]]
        }))
        .unwrap();
        geometry.set_owner("Delft", "building-1");

        let value = serde_json::to_value(&geometry).unwrap();
        assert_eq!(value["CityModel"], "Delft");
        assert_eq!(value["CityObject"], "building-1");
        assert_eq!(geometry.vertex_indices(), vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_instance_matrices() {
        let mut matrix: Vec<Value> = vec![json!(0.0); 32];
        matrix[0] = json!(1.0);
        matrix[16] = json!(2.0);
        let geometry = validate(&json!({
            "type": "GeometryInstance",
            "template": 0,
            "boundaries": [5],
            "transformationMatrix": matrix
        }))
        .unwrap();

        let Geometry::Instance(instance) = geometry else {
            panic!("expected an instance");
        };
        let matrices = instance.matrices();
        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices[0][0], 1.0);
        assert_eq!(matrices[1][0], 2.0);
    }
}
