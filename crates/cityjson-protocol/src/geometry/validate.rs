//! Structural validation of raw CityJSON geometries.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::registry::{shape_of, GeometryType, NestingSpec};
use super::{
    Geometry, GeometryError, GeometryInstance, Lod, MaterialTheme, Nested, SemanticSurface,
    Semantics, ShapedGeometry, TextureTheme,
};

/// Whole-value LoD pattern: digits 0-3, each optionally followed by one period.
const LOD_PATTERN: &str = r"^([0-3]\.?)+[0-3]?$";

fn lod_regex() -> &'static Regex {
    static LOD: OnceLock<Regex> = OnceLock::new();
    LOD.get_or_init(|| Regex::new(LOD_PATTERN).expect("LoD pattern is a valid regex"))
}

/// Check a level-of-detail string against the LoD pattern.
pub fn is_valid_lod(text: &str) -> bool {
    lod_regex().is_match(text)
}

/// Validate a raw geometry and return its typed form.
///
/// Vertex indices are checked for type only; they are not resolved against
/// any vertex list.
pub fn validate(raw: &Value) -> Result<Geometry, GeometryError> {
    let object = raw.as_object().ok_or(GeometryError::NotAnObject)?;

    let tag = match object.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => return Err(GeometryError::UnknownGeometryType(other.to_string())),
        None => return Err(GeometryError::MissingMember("type")),
    };
    let geometry_type: GeometryType = tag.parse()?;

    match shape_of(geometry_type) {
        Some(spec) => validate_shaped(geometry_type, spec, object).map(Geometry::Shaped),
        None => validate_instance(object).map(Geometry::Instance),
    }
}

fn validate_shaped(
    geometry_type: GeometryType,
    spec: NestingSpec,
    object: &Map<String, Value>,
) -> Result<ShapedGeometry, GeometryError> {
    let lod = Lod::from_value(object.get("lod").ok_or(GeometryError::MissingMember("lod"))?)?;

    let boundaries = read_boundaries(
        object
            .get("boundaries")
            .ok_or(GeometryError::MissingMember("boundaries"))?,
        spec.boundaries,
    )?;

    let semantics = match permitted(object, "semantics", spec.semantics, geometry_type)? {
        Some((value, depth)) => Some(read_semantics(value, depth)?),
        None => None,
    };

    let material = match permitted(object, "material", spec.material, geometry_type)? {
        Some((value, depth)) => Some(read_material(value, depth)?),
        None => None,
    };

    let texture = match permitted(object, "texture", spec.texture, geometry_type)? {
        Some((value, depth)) => Some(read_texture(value, depth)?),
        None => None,
    };

    Ok(ShapedGeometry {
        geometry_type,
        city_model: optional_string(object, "CityModel")?,
        city_object: optional_string(object, "CityObject")?,
        lod,
        boundaries,
        semantics,
        material,
        texture,
    })
}

fn validate_instance(object: &Map<String, Value>) -> Result<GeometryInstance, GeometryError> {
    for member in ["semantics", "material", "texture"] {
        if object.get(member).is_some_and(|v| !v.is_null()) {
            return Err(GeometryError::MemberNotPermitted {
                member,
                geometry_type: GeometryType::GeometryInstance,
            });
        }
    }

    let template = object
        .get("template")
        .ok_or(GeometryError::MissingMember("template"))?;
    let template = as_index(template)
        .ok_or_else(|| GeometryError::InvalidTemplate(template.to_string()))?;

    let boundaries = read_boundaries(
        object
            .get("boundaries")
            .ok_or(GeometryError::MissingMember("boundaries"))?,
        1,
    )?;
    let mut anchors = Vec::new();
    boundaries.for_each_leaf(&mut |i| anchors.push(*i));

    let matrix = match object.get("transformationMatrix") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(GeometryError::InvalidTransformationMatrix(format!(
                "expected an array of numbers, found {}",
                other
            )))
        }
        None => return Err(GeometryError::MissingMember("transformationMatrix")),
    };
    if matrix.is_empty() || matrix.len() % 16 != 0 {
        return Err(GeometryError::InvalidTransformationMatrix(format!(
            "length {} is not a non-zero multiple of 16",
            matrix.len()
        )));
    }
    let transformation_matrix = matrix
        .iter()
        .map(|v| match v {
            Value::Number(n) => Ok(n.clone()),
            other => Err(GeometryError::InvalidTransformationMatrix(format!(
                "non-numeric entry {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GeometryInstance {
        geometry_type: GeometryType::GeometryInstance,
        city_model: optional_string(object, "CityModel")?,
        city_object: optional_string(object, "CityObject")?,
        template,
        boundaries: anchors,
        transformation_matrix,
    })
}

/// Returns the member and its required depth when present and allowed.
///
/// Absent and `null` members are both treated as absent.
fn permitted<'a>(
    object: &'a Map<String, Value>,
    member: &'static str,
    depth: Option<usize>,
    geometry_type: GeometryType,
) -> Result<Option<(&'a Value, usize)>, GeometryError> {
    match (object.get(member), depth) {
        (None, _) | (Some(Value::Null), _) => Ok(None),
        (Some(_), None) => Err(GeometryError::MemberNotPermitted {
            member,
            geometry_type,
        }),
        (Some(value), Some(depth)) => Ok(Some((value, depth))),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    member: &'static str,
) -> Result<Option<String>, GeometryError> {
    match object.get(member) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(GeometryError::InvalidMember {
            member,
            reason: format!("expected a string, found {}", other),
        }),
    }
}

fn as_index(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

/// Depth of a JSON value along its deepest branch.
fn array_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(array_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Walk `value` expecting exactly `expected` levels of arrays above every leaf.
///
/// An empty array above leaf level ends its branch short and is a mismatch.
/// `mismatch` receives `(expected, actual)` where `actual` is the depth seen
/// on the offending branch.
fn walk<T, L, M>(
    value: &Value,
    expected: usize,
    level: usize,
    leaf: &L,
    mismatch: &M,
) -> Result<Nested<T>, GeometryError>
where
    L: Fn(&Value) -> Result<T, GeometryError>,
    M: Fn(usize, usize) -> GeometryError,
{
    if level == expected {
        if value.is_array() {
            return Err(mismatch(expected, level + array_depth(value)));
        }
        return leaf(value).map(Nested::Leaf);
    }

    match value {
        Value::Array(items) if items.is_empty() => Err(mismatch(expected, level + 1)),
        Value::Array(items) => items
            .iter()
            .map(|item| walk(item, expected, level + 1, leaf, mismatch))
            .collect::<Result<Vec<_>, _>>()
            .map(Nested::List),
        _ => Err(mismatch(expected, level)),
    }
}

fn read_boundaries(value: &Value, depth: usize) -> Result<Nested<u32>, GeometryError> {
    walk(
        value,
        depth,
        0,
        &|leaf: &Value| {
            as_index(leaf).ok_or_else(|| GeometryError::BoundaryElementTypeError(leaf.to_string()))
        },
        &|expected: usize, actual: usize| GeometryError::BoundaryDepthMismatch { expected, actual },
    )
}

/// Read a values array whose leaves are `null` or an index.
fn read_values(
    value: &Value,
    depth: usize,
    member: &'static str,
    bad_leaf: fn(String) -> GeometryError,
) -> Result<Nested<Option<u32>>, GeometryError> {
    walk(
        value,
        depth,
        0,
        &|leaf: &Value| match leaf {
            Value::Null => Ok(None),
            other => as_index(other)
                .map(Some)
                .ok_or_else(|| bad_leaf(format!("{} value {} is not an index", member, other))),
        },
        &|expected: usize, actual: usize| GeometryError::ValuesDepthMismatch {
            member,
            expected,
            actual,
        },
    )
}

fn read_semantics(value: &Value, depth: usize) -> Result<Semantics, GeometryError> {
    let object = value
        .as_object()
        .ok_or_else(|| GeometryError::InvalidSemantics("semantics must be an object".into()))?;

    let surfaces = match object.get("surfaces") {
        Some(Value::Array(items)) => items
            .iter()
            .map(read_surface)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(GeometryError::InvalidSemantics(
                "surfaces must be an array".into(),
            ))
        }
        None => return Err(GeometryError::InvalidSemantics("missing surfaces".into())),
    };

    let values = object
        .get("values")
        .ok_or_else(|| GeometryError::InvalidSemantics("missing values".into()))?;
    let values = read_values(values, depth, "semantics", GeometryError::InvalidSemantics)?;

    let in_range = |index: u32| {
        if (index as usize) < surfaces.len() {
            Ok(())
        } else {
            Err(GeometryError::SemanticsIndexOutOfRange {
                index,
                surfaces: surfaces.len(),
            })
        }
    };

    values.try_for_each_leaf(&mut |leaf| leaf.map_or(Ok(()), in_range))?;
    for surface in &surfaces {
        surface.parent.map_or(Ok(()), in_range)?;
        for child in surface.children.iter().flatten() {
            in_range(*child)?;
        }
    }

    Ok(Semantics { surfaces, values })
}

fn read_surface(value: &Value) -> Result<SemanticSurface, GeometryError> {
    let mut attributes = value
        .as_object()
        .cloned()
        .ok_or_else(|| GeometryError::InvalidSemantics("surfaces must be objects".into()))?;

    let surface_type = match attributes.remove("type") {
        Some(Value::String(s)) => s,
        _ => {
            return Err(GeometryError::InvalidSemantics(
                "every surface needs a string 'type'".into(),
            ))
        }
    };

    let parent = match attributes.remove("parent") {
        None | Some(Value::Null) => None,
        Some(v) => Some(as_index(&v).ok_or_else(|| {
            GeometryError::InvalidSemantics(format!("parent {} is not an index", v))
        })?),
    };

    let children = match attributes.remove("children") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|c| {
                    as_index(c).ok_or_else(|| {
                        GeometryError::InvalidSemantics(format!("child {} is not an index", c))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(v) => {
            return Err(GeometryError::InvalidSemantics(format!(
                "children must be an array, found {}",
                v
            )))
        }
    };

    Ok(SemanticSurface {
        surface_type,
        parent,
        children,
        attributes,
    })
}

fn themes(value: &Value, member: &str) -> Result<Vec<(String, Map<String, Value>)>, GeometryError> {
    let object = value
        .as_object()
        .ok_or_else(|| GeometryError::InvalidAppearance(format!("{} must be an object", member)))?;

    object
        .iter()
        .map(|(name, theme)| {
            theme
                .as_object()
                .cloned()
                .map(|t| (name.clone(), t))
                .ok_or_else(|| {
                    GeometryError::InvalidAppearance(format!(
                        "{} theme '{}' must be an object",
                        member, name
                    ))
                })
        })
        .collect()
}

fn read_material(value: &Value, depth: usize) -> Result<BTreeMap<String, MaterialTheme>, GeometryError> {
    let mut out = BTreeMap::new();
    for (name, theme) in themes(value, "material")? {
        let values = match theme.get("values") {
            None | Some(Value::Null) => None,
            Some(v) => Some(read_values(v, depth, "material", GeometryError::InvalidAppearance)?),
        };
        let single = match theme.get("value") {
            None | Some(Value::Null) => None,
            Some(v) => Some(as_index(v).ok_or_else(|| {
                GeometryError::InvalidAppearance(format!(
                    "material theme '{}' value {} is not an index",
                    name, v
                ))
            })?),
        };
        if values.is_some() == single.is_some() {
            return Err(GeometryError::InvalidAppearance(format!(
                "material theme '{}' needs exactly one of 'values' or 'value'",
                name
            )));
        }
        out.insert(
            name,
            MaterialTheme {
                values,
                value: single,
            },
        );
    }
    Ok(out)
}

fn read_texture(value: &Value, depth: usize) -> Result<BTreeMap<String, TextureTheme>, GeometryError> {
    let mut out = BTreeMap::new();
    for (name, theme) in themes(value, "texture")? {
        let values = theme.get("values").ok_or_else(|| {
            GeometryError::InvalidAppearance(format!("texture theme '{}' has no values", name))
        })?;
        let values = read_values(values, depth, "texture", GeometryError::InvalidAppearance)?;
        out.insert(name, TextureTheme { values });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn solid() -> Value {
        json!({
            "type": "Solid",
            "lod": "2",
            "boundaries": [
                [[[0, 3, 2, 1]], [[4, 5, 6, 7]], [[0, 1, 5, 4]]],
                [[[8, 9, 10]]]
            ],
            "semantics": {
                "surfaces": [
                    {"type": "GroundSurface"},
                    {"type": "WallSurface", "slope": 33.4, "children": [2]},
                    {"type": "Door", "parent": 1}
                ],
                "values": [[0, 1, null], [2]]
            },
            "material": {
                "visual": {"values": [[0, 0, 1], [null]]},
                "irradiation": {"value": 3}
            },
            "texture": {
                "winter": {"values": [
                    [[[0, 10, 11, 12, 13]], [[null]], [[1, 2, 3, 4, 5]]],
                    [[[null]]]
                ]}
            }
        })
    }

    #[test]
    fn test_lod_pattern() {
        for ok in ["2", "2.1", "0.3", "1", "3.3"] {
            assert!(is_valid_lod(ok), "{} should be valid", ok);
        }
        for bad in ["4", "2.4", "abc", "", "-1", "2.."] {
            assert!(!is_valid_lod(bad), "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_invalid_lod_rejected() {
        let mut raw = solid();
        raw["lod"] = json!("2.4");
        assert_eq!(validate(&raw), Err(GeometryError::InvalidLod("2.4".into())));

        raw["lod"] = json!(4);
        assert_eq!(validate(&raw), Err(GeometryError::InvalidLod("4".into())));
    }

    #[test]
    fn test_valid_solid() {
        let geometry = validate(&solid()).unwrap();
        let Geometry::Shaped(shaped) = &geometry else {
            panic!("expected a shaped geometry");
        };
        assert_eq!(shaped.geometry_type, GeometryType::Solid);
        assert_eq!(shaped.boundaries.depth(), 4);
        assert_eq!(shaped.semantics.as_ref().unwrap().surfaces.len(), 3);
        assert_eq!(
            shaped.semantics.as_ref().unwrap().surfaces[1].attributes["slope"],
            json!(33.4)
        );
        assert_eq!(shaped.material.as_ref().unwrap()["irradiation"].value, Some(3));
    }

    #[test]
    fn test_solid_round_trip() {
        let raw = solid();
        let geometry = validate(&raw).unwrap();
        let written = serde_json::to_value(&geometry).unwrap();

        assert_eq!(written, raw);
        assert_eq!(
            serde_json::to_string(&written["boundaries"]).unwrap(),
            serde_json::to_string(&raw["boundaries"]).unwrap()
        );
    }

    #[test]
    fn test_unknown_type() {
        let raw = json!({"type": "Polygon", "lod": "1", "boundaries": []});
        assert_eq!(
            validate(&raw),
            Err(GeometryError::UnknownGeometryType("Polygon".into()))
        );
    }

    #[test]
    fn test_missing_members() {
        assert_eq!(
            validate(&json!({"lod": "1"})),
            Err(GeometryError::MissingMember("type"))
        );
        assert_eq!(
            validate(&json!({"type": "MultiPoint", "boundaries": [0]})),
            Err(GeometryError::MissingMember("lod"))
        );
        assert_eq!(
            validate(&json!({"type": "MultiPoint", "lod": "1"})),
            Err(GeometryError::MissingMember("boundaries"))
        );
        assert_eq!(validate(&json!([1, 2])), Err(GeometryError::NotAnObject));
    }

    /// Wrap `inner` in `levels` single-element arrays.
    fn nest(inner: Value, levels: usize) -> Value {
        (0..levels).fold(inner, |acc, _| json!([acc]))
    }

    #[test]
    fn test_boundary_depth_off_by_one() {
        for geometry_type in [
            GeometryType::MultiPoint,
            GeometryType::MultiLineString,
            GeometryType::MultiSurface,
            GeometryType::CompositeSurface,
            GeometryType::Solid,
            GeometryType::MultiSolid,
            GeometryType::CompositeSolid,
        ] {
            let depth = shape_of(geometry_type).unwrap().boundaries;

            let exact = json!({"type": geometry_type.as_str(), "lod": "1", "boundaries": nest(json!(0), depth)});
            assert!(validate(&exact).is_ok(), "{} exact depth", geometry_type);

            let deeper = json!({"type": geometry_type.as_str(), "lod": "1", "boundaries": nest(json!(0), depth + 1)});
            assert_eq!(
                validate(&deeper),
                Err(GeometryError::BoundaryDepthMismatch {
                    expected: depth,
                    actual: depth + 1
                }),
                "{} too deep",
                geometry_type
            );

            let shallower = json!({"type": geometry_type.as_str(), "lod": "1", "boundaries": nest(json!(0), depth - 1)});
            assert_eq!(
                validate(&shallower),
                Err(GeometryError::BoundaryDepthMismatch {
                    expected: depth,
                    actual: depth - 1
                }),
                "{} too shallow",
                geometry_type
            );
        }
    }

    #[test]
    fn test_ragged_boundaries_rejected() {
        let raw = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]], [3, 4, 5]]
        });
        assert_eq!(
            validate(&raw),
            Err(GeometryError::BoundaryDepthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_empty_boundaries_rejected() {
        let cases = [
            (json!([]), 1),
            (json!([[]]), 2),
            (json!([[[[0, 1, 2]]], [[]]]), 3),
        ];
        for (boundaries, actual) in cases {
            let raw = json!({"type": "Solid", "lod": "1", "boundaries": boundaries});
            assert_eq!(
                validate(&raw),
                Err(GeometryError::BoundaryDepthMismatch { expected: 4, actual })
            );
        }

        let raw = json!({"type": "MultiPoint", "lod": "1", "boundaries": []});
        assert_eq!(
            validate(&raw),
            Err(GeometryError::BoundaryDepthMismatch { expected: 1, actual: 1 })
        );
    }

    #[test]
    fn test_empty_semantic_values_rejected() {
        let raw = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "RoofSurface"}], "values": []}
        });
        assert!(matches!(
            validate(&raw),
            Err(GeometryError::ValuesDepthMismatch { member: "semantics", expected: 1, actual: 1 })
        ));
    }

    #[test]
    fn test_boundary_element_type() {
        for leaf in [json!(1.5), json!("3"), json!(null), json!(-1)] {
            let raw = json!({"type": "MultiPoint", "lod": "1", "boundaries": [0, leaf]});
            assert!(
                matches!(validate(&raw), Err(GeometryError::BoundaryElementTypeError(_))),
                "leaf {} should be rejected",
                leaf
            );
        }
    }

    #[test]
    fn test_semantics_index_range() {
        let surfaces = json!([{"type": "WallSurface"}, {"type": "RoofSurface"}]);

        let last = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]], [[2, 3, 0]]],
            "semantics": {"surfaces": surfaces, "values": [0, 1]}
        });
        assert!(validate(&last).is_ok());

        let past_end = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]], [[2, 3, 0]]],
            "semantics": {"surfaces": surfaces, "values": [0, 2]}
        });
        assert_eq!(
            validate(&past_end),
            Err(GeometryError::SemanticsIndexOutOfRange {
                index: 2,
                surfaces: 2
            })
        );
    }

    #[test]
    fn test_semantics_depth_and_shape() {
        let raw = json!({
            "type": "Solid",
            "lod": "2",
            "boundaries": [[[[0, 1, 2]]]],
            "semantics": {"surfaces": [{"type": "WallSurface"}], "values": [0]}
        });
        assert_eq!(
            validate(&raw),
            Err(GeometryError::ValuesDepthMismatch {
                member: "semantics",
                expected: 2,
                actual: 1
            })
        );

        let untyped = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"slope": 3}], "values": [0]}
        });
        assert!(matches!(
            validate(&untyped),
            Err(GeometryError::InvalidSemantics(_))
        ));

        let bad_parent = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]]],
            "semantics": {"surfaces": [{"type": "Door", "parent": 4}], "values": [0]}
        });
        assert_eq!(
            validate(&bad_parent),
            Err(GeometryError::SemanticsIndexOutOfRange {
                index: 4,
                surfaces: 1
            })
        );
    }

    #[test]
    fn test_semantics_not_permitted_on_points() {
        let raw = json!({
            "type": "MultiPoint",
            "lod": "1",
            "boundaries": [0, 1],
            "semantics": {"surfaces": [], "values": []}
        });
        assert_eq!(
            validate(&raw),
            Err(GeometryError::MemberNotPermitted {
                member: "semantics",
                geometry_type: GeometryType::MultiPoint
            })
        );
    }

    #[test]
    fn test_material_and_texture_depths() {
        let raw = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]]],
            "material": {"visual": {"values": [[0]]}}
        });
        assert_eq!(
            validate(&raw),
            Err(GeometryError::ValuesDepthMismatch {
                member: "material",
                expected: 1,
                actual: 2
            })
        );

        let raw = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]]],
            "texture": {"summer": {"values": [[0, 1, 2, 3]]}}
        });
        assert_eq!(
            validate(&raw),
            Err(GeometryError::ValuesDepthMismatch {
                member: "texture",
                expected: 3,
                actual: 2
            })
        );

        let raw = json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]]],
            "material": {"visual": {"values": [0], "value": 1}}
        });
        assert!(matches!(
            validate(&raw),
            Err(GeometryError::InvalidAppearance(_))
        ));
    }

    #[test]
    fn test_geometry_instance() {
        let matrix: Vec<f64> = vec![
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ];
        let raw = json!({
            "type": "GeometryInstance",
            "template": 0,
            "boundaries": [372],
            "transformationMatrix": matrix
        });
        let geometry = validate(&raw).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::GeometryInstance);
        assert_eq!(serde_json::to_value(&geometry).unwrap(), raw);
    }

    #[test]
    fn test_geometry_instance_errors() {
        let matrix_15 = vec![0.0; 15];
        let raw = json!({
            "type": "GeometryInstance",
            "template": 0,
            "boundaries": [1],
            "transformationMatrix": matrix_15
        });
        assert!(matches!(
            validate(&raw),
            Err(GeometryError::InvalidTransformationMatrix(_))
        ));

        let raw = json!({
            "type": "GeometryInstance",
            "template": 0,
            "boundaries": [1],
            "transformationMatrix": []
        });
        assert!(matches!(
            validate(&raw),
            Err(GeometryError::InvalidTransformationMatrix(_))
        ));

        let raw = json!({
            "type": "GeometryInstance",
            "template": -1,
            "boundaries": [1],
            "transformationMatrix": vec![0.0; 16]
        });
        assert!(matches!(validate(&raw), Err(GeometryError::InvalidTemplate(_))));
    }
}
