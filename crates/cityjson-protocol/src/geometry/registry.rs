//! The closed set of CityJSON geometry types and their nesting rules.
//!
//! Every array-nested geometry type fixes how deep its `boundaries`,
//! `semantics.values`, `material.*.values` and `texture.*.values` arrays are.
//! The table lives here, in one place, and the validator walks it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::GeometryError;

/// A CityJSON geometry type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    MultiPoint,
    MultiLineString,
    MultiSurface,
    CompositeSurface,
    Solid,
    MultiSolid,
    CompositeSolid,
    GeometryInstance,
}

impl GeometryType {
    /// All geometry types, in registry order.
    pub const ALL: [GeometryType; 8] = [
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiSurface,
        GeometryType::CompositeSurface,
        GeometryType::Solid,
        GeometryType::MultiSolid,
        GeometryType::CompositeSolid,
        GeometryType::GeometryInstance,
    ];

    /// The tag as it appears in the `type` member.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiSurface => "MultiSurface",
            GeometryType::CompositeSurface => "CompositeSurface",
            GeometryType::Solid => "Solid",
            GeometryType::MultiSolid => "MultiSolid",
            GeometryType::CompositeSolid => "CompositeSolid",
            GeometryType::GeometryInstance => "GeometryInstance",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GeometryError::UnknownGeometryType(s.to_string()))
    }
}

/// Array nesting levels for one geometry type (0 = scalar).
///
/// `None` means the member is not permitted on that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestingSpec {
    pub boundaries: usize,
    pub semantics: Option<usize>,
    pub material: Option<usize>,
    pub texture: Option<usize>,
}

const MULTI_POINT: NestingSpec = NestingSpec {
    boundaries: 1,
    semantics: None,
    material: None,
    texture: None,
};

const MULTI_LINE_STRING: NestingSpec = NestingSpec {
    boundaries: 2,
    semantics: None,
    material: None,
    texture: None,
};

const SURFACES: NestingSpec = NestingSpec {
    boundaries: 3,
    semantics: Some(1),
    material: Some(1),
    texture: Some(3),
};

const SOLID: NestingSpec = NestingSpec {
    boundaries: 4,
    semantics: Some(2),
    material: Some(2),
    texture: Some(4),
};

const SOLIDS: NestingSpec = NestingSpec {
    boundaries: 5,
    semantics: Some(3),
    material: Some(3),
    texture: Some(5),
};

/// Look up the nesting spec for a geometry type.
///
/// Returns `None` for [`GeometryType::GeometryInstance`], which is not
/// shape-typed like the other variants.
pub fn shape_of(geometry_type: GeometryType) -> Option<NestingSpec> {
    match geometry_type {
        GeometryType::MultiPoint => Some(MULTI_POINT),
        GeometryType::MultiLineString => Some(MULTI_LINE_STRING),
        GeometryType::MultiSurface | GeometryType::CompositeSurface => Some(SURFACES),
        GeometryType::Solid => Some(SOLID),
        GeometryType::MultiSolid | GeometryType::CompositeSolid => Some(SOLIDS),
        GeometryType::GeometryInstance => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_table() {
        let cases = [
            (GeometryType::MultiPoint, 1, None, None, None),
            (GeometryType::MultiLineString, 2, None, None, None),
            (GeometryType::MultiSurface, 3, Some(1), Some(1), Some(3)),
            (GeometryType::CompositeSurface, 3, Some(1), Some(1), Some(3)),
            (GeometryType::Solid, 4, Some(2), Some(2), Some(4)),
            (GeometryType::MultiSolid, 5, Some(3), Some(3), Some(5)),
            (GeometryType::CompositeSolid, 5, Some(3), Some(3), Some(5)),
        ];

        for (geometry_type, boundaries, semantics, material, texture) in cases {
            let spec = shape_of(geometry_type).unwrap();
            assert_eq!(spec.boundaries, boundaries, "{}", geometry_type);
            assert_eq!(spec.semantics, semantics, "{}", geometry_type);
            assert_eq!(spec.material, material, "{}", geometry_type);
            assert_eq!(spec.texture, texture, "{}", geometry_type);
        }
    }

    #[test]
    fn test_geometry_instance_has_no_shape() {
        assert!(shape_of(GeometryType::GeometryInstance).is_none());
    }

    #[test]
    fn test_parse_tags() {
        for t in GeometryType::ALL {
            assert_eq!(t.as_str().parse::<GeometryType>().unwrap(), t);
        }
        assert!(matches!(
            "Polygon".parse::<GeometryType>(),
            Err(GeometryError::UnknownGeometryType(tag)) if tag == "Polygon"
        ));
        // Tags are case-sensitive.
        assert!("solid".parse::<GeometryType>().is_err());
    }
}
