//! Import of CityJSON documents into city models and objects.
//!
//! Import is all-or-nothing: one invalid object rejects the document, so
//! storage never sees a partially valid model.

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::city::{CityModel, CityObject, CityObjectError, Location};
use crate::geometry::{self, Geometry, GeometryError};

/// Errors raised while importing a CityJSON document.
#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    /// The document is not a CityJSON object.
    #[error("Not a CityJSON document: {0}")]
    NotCityJson(String),

    /// A city object was rejected.
    #[error(transparent)]
    Object(#[from] CityObjectError),

    /// A geometry template failed validation.
    #[error("Geometry template {index} is invalid: {source}")]
    Template {
        index: usize,
        #[source]
        source: GeometryError,
    },

    /// A geometry instance points past the template list.
    #[error("'{object}' references template {template}, but only {available} exist")]
    TemplateOutOfRange {
        object: String,
        template: u32,
        available: usize,
    },

    /// `vertices` or `transform` is malformed.
    #[error("Invalid vertices: {0}")]
    InvalidVertices(String),
}

/// A validated model ready to be written to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedModel {
    pub model: CityModel,
    pub objects: Vec<CityObject>,
}

/// Vertex scale/translate from the document `transform` member.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    scale: [f64; 3],
    translate: [f64; 3],
}

impl Transform {
    const IDENTITY: Transform = Transform {
        scale: [1.0; 3],
        translate: [0.0; 3],
    };

    fn parse(value: Option<&Value>) -> Result<Self, ImportError> {
        let Some(value) = value else {
            return Ok(Self::IDENTITY);
        };
        let triple = |member: &str| -> Result<[f64; 3], ImportError> {
            let numbers = value
                .get(member)
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_f64).collect::<Vec<_>>())
                .unwrap_or_default();
            <[f64; 3]>::try_from(numbers).map_err(|_| {
                ImportError::InvalidVertices(format!("transform.{} must hold 3 numbers", member))
            })
        };
        Ok(Self {
            scale: triple("scale")?,
            translate: triple("translate")?,
        })
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

/// Model name for a file: its name up to the first dot.
///
/// `Delft.city.json` gives `Delft`. `None` when the name is not UTF-8 or the
/// stem is empty, as for `.json`.
pub fn model_name_for_file(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    file_name.split('.').next().filter(|stem| !stem.is_empty())
}

/// Import a CityJSON document under the given model name.
pub fn import_document(name: &str, document: &Value) -> Result<ImportedModel, ImportError> {
    let root = document
        .as_object()
        .ok_or_else(|| ImportError::NotCityJson("document is not an object".into()))?;

    match root.get("type").and_then(Value::as_str) {
        Some("CityJSON") => {}
        other => {
            return Err(ImportError::NotCityJson(format!(
                "type is {:?}, expected \"CityJSON\"",
                other
            )))
        }
    }

    let transform = Transform::parse(root.get("transform"))?;
    let vertices = read_vertices(root.get("vertices"), &transform)?;
    let template_count = validate_templates(root.get("geometry-templates"))?;

    let metadata = match root.get("metadata") {
        None => Value::Object(Map::new()),
        Some(m @ Value::Object(_)) => m.clone(),
        Some(_) => return Err(ImportError::NotCityJson("metadata must be an object".into())),
    };
    let geographic = match metadata.get("referenceSystem") {
        None => true,
        Some(Value::String(crs)) => is_geographic(crs),
        Some(_) => {
            return Err(ImportError::NotCityJson(
                "metadata.referenceSystem must be a string".into(),
            ))
        }
    };

    let empty = Map::new();
    let city_objects = match root.get("CityObjects") {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => return Err(ImportError::NotCityJson("CityObjects must be an object".into())),
    };

    let mut objects = Vec::with_capacity(city_objects.len());
    for (id, raw) in city_objects {
        let mut object = CityObject::from_raw(name, id, raw)?;

        for g in &object.geometry {
            if let Geometry::Instance(instance) = g {
                if instance.template as usize >= template_count {
                    return Err(ImportError::TemplateOutOfRange {
                        object: id.clone(),
                        template: instance.template,
                        available: template_count,
                    });
                }
            }
        }

        if geographic {
            object.location = locate(&object, &vertices);
        }
        objects.push(object);
    }

    Ok(ImportedModel {
        model: CityModel::new(name, metadata),
        objects,
    })
}

fn read_vertices(value: Option<&Value>, transform: &Transform) -> Result<Vec<(f64, f64)>, ImportError> {
    let items = match value {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ImportError::InvalidVertices("vertices must be an array".into())),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let coords = v.as_array().filter(|c| c.len() >= 2).ok_or_else(|| {
                ImportError::InvalidVertices(format!("vertex {} is not a coordinate triple", i))
            })?;
            match (coords[0].as_f64(), coords[1].as_f64()) {
                (Some(x), Some(y)) => Ok(transform.apply(x, y)),
                _ => Err(ImportError::InvalidVertices(format!(
                    "vertex {} has non-numeric coordinates",
                    i
                ))),
            }
        })
        .collect()
}

fn validate_templates(value: Option<&Value>) -> Result<usize, ImportError> {
    let Some(value) = value else {
        return Ok(0);
    };
    let templates = value.get("templates").and_then(Value::as_array).ok_or_else(|| {
        ImportError::NotCityJson("geometry-templates.templates must be an array".into())
    })?;

    for (index, template) in templates.iter().enumerate() {
        geometry::validate(template).map_err(|source| ImportError::Template { index, source })?;
    }
    Ok(templates.len())
}

/// Whether a `referenceSystem` names a longitude/latitude CRS.
///
/// Accepts `EPSG:4326`, `urn:ogc:def:crs:EPSG::4326`,
/// `http://www.opengis.net/def/crs/EPSG/0/4326` and the same forms of 4979,
/// plus OGC CRS84.
fn is_geographic(crs: &str) -> bool {
    let code = crs.rsplit(|c| c == ':' || c == '/').next().unwrap_or_default();
    match code {
        "CRS84" | "CRS84h" => true,
        "4326" | "4979" => crs.contains("EPSG"),
        _ => false,
    }
}

/// Centroid of the vertices an object references, when it is a valid lon/lat.
///
/// Indices outside the vertex list are skipped; they are not resolved by
/// geometry validation.
fn locate(object: &CityObject, vertices: &[(f64, f64)]) -> Option<Location> {
    let (mut sum_x, mut sum_y, mut n) = (0.0, 0.0, 0usize);
    for index in object.geometry.iter().flat_map(Geometry::vertex_indices) {
        if let Some((x, y)) = vertices.get(index as usize) {
            sum_x += x;
            sum_y += y;
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }

    let (lon, lat) = (sum_x / n as f64, sum_y / n as f64);
    ((-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat))
        .then(|| Location::new(lon, lat))
}
