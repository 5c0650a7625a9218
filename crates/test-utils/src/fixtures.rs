//! Common test fixtures for CityJSON features tests.
//!
//! The Delft document places two city blocks a few kilometres apart so
//! spatial filters can select one or the other:
//!
//! | object | type                      | location          |
//! |--------|---------------------------|-------------------|
//! | b1     | Building (roofType=flat)  | (4.355, 52.005)   |
//! | b2     | Building (roofType=gabled)| (4.455, 52.105)   |
//! | bp1    | BuildingPart of b1        | (4.355, 52.0)     |
//! | t1     | Tunnel                    | (4.355, 52.005)   |
//! | ti1    | TunnelInstallation of t1  | (4.355, 52.005)   |
//! | tree   | SolitaryVegetationObject  | (4.45, 52.1)      |

use serde_json::{json, Value};

/// Name the Delft document is imported under.
pub const DELFT: &str = "Delft";

/// Number of city objects in [`delft_document`].
pub const DELFT_OBJECT_COUNT: usize = 6;

/// Bounding boxes over the Delft fixture, as `bbox` query values.
pub mod bbox {
    /// Covers b1, bp1, t1 and ti1.
    pub const FIRST_BLOCK: &str = "4.3,51.9,4.4,52.05";

    /// Covers b2 and tree.
    pub const SECOND_BLOCK: &str = "4.4,52.05,4.5,52.2";

    /// Valid rectangle far away from every fixture object.
    pub const EMPTY_AREA: &str = "10,10,20,20";

    /// Longitude below -180.
    pub const BAD_LONGITUDE: &str = "-200,10,-100,20";

    /// Min longitude above max longitude.
    pub const INVERTED: &str = "10,10,5,20";

    /// Six numbers, a 3D box.
    pub const THREE_D: &str = "10,10,0,20,20,100";
}

/// Raw geometries, one per interesting shape.
pub mod geometry {
    use serde_json::{json, Value};

    /// A unit cube as a Solid with semantics and a material theme.
    pub fn solid() -> Value {
        json!({
            "type": "Solid",
            "lod": "2.2",
            "boundaries": [[
                [[0, 3, 2, 1]], [[4, 5, 6, 7]], [[0, 1, 5, 4]],
                [[1, 2, 6, 5]], [[2, 3, 7, 6]], [[3, 0, 4, 7]]
            ]],
            "semantics": {
                "surfaces": [
                    {"type": "GroundSurface"},
                    {"type": "RoofSurface", "slope": 0.0},
                    {"type": "WallSurface"}
                ],
                "values": [[0, 1, 2, 2, 2, 2]]
            },
            "material": {
                "irradiation": {"values": [[0, 0, 1, 1, 1, null]]}
            }
        })
    }

    /// Two surfaces with ground and roof semantics.
    pub fn multi_surface() -> Value {
        json!({
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2, 3]], [[4, 5, 6, 7]]],
            "semantics": {
                "surfaces": [{"type": "GroundSurface"}, {"type": "RoofSurface"}],
                "values": [0, 1]
            }
        })
    }

    /// Two solids sharing a face.
    pub fn composite_solid() -> Value {
        json!({
            "type": "CompositeSolid",
            "lod": 1,
            "boundaries": [
                [[[0, 1, 2, 3]], [[4, 5, 6, 7]]],
                [[[8, 9, 10, 11]], [[4, 5, 6, 7]]]
            ]
        })
    }

    /// Instance of template 0 at vertex 8.
    pub fn geometry_instance() -> Value {
        json!({
            "type": "GeometryInstance",
            "template": 0,
            "boundaries": [8],
            "transformationMatrix": [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0
            ]
        })
    }
}

/// Eight corners of a cube starting at `(x, y)` in transformed units:
/// the bottom ring first, then the top ring.
fn cube_vertices(x: i64, y: i64) -> Vec<Value> {
    let ring = [(0, 0), (100, 0), (100, 100), (0, 100)];
    [0, 100]
        .iter()
        .flat_map(|z| ring.iter().map(move |(dx, dy)| json!([x + dx, y + dy, z])))
        .collect()
}

fn cube(offset: u32) -> Value {
    let v = |i: u32| offset + i;
    json!([[
        [[v(0), v(3), v(2), v(1)]],
        [[v(4), v(5), v(6), v(7)]],
        [[v(0), v(1), v(5), v(4)]],
        [[v(1), v(2), v(6), v(5)]],
        [[v(2), v(3), v(7), v(6)]],
        [[v(3), v(0), v(4), v(7)]]
    ]])
}

/// A CityJSON document in WGS84 with buildings, a tunnel and a tree.
pub fn delft_document() -> Value {
    let mut vertices = cube_vertices(0, 0);
    vertices.extend(cube_vertices(1000, 1000));

    json!({
        "type": "CityJSON",
        "version": "1.0",
        "metadata": {
            "referenceSystem": "urn:ogc:def:crs:EPSG::4326",
            "title": "Delft test district"
        },
        "transform": {
            "scale": [0.0001, 0.0001, 0.01],
            "translate": [4.35, 52.0, 0.0]
        },
        "vertices": vertices,
        "CityObjects": {
            "b1": {
                "type": "Building",
                "attributes": {"roofType": "flat", "yearOfConstruction": 1985},
                "children": ["bp1"],
                "geometry": [{
                    "type": "MultiSurface",
                    "lod": "2",
                    "boundaries": [[[0, 1, 2, 3]], [[4, 5, 6, 7]]],
                    "semantics": {
                        "surfaces": [{"type": "GroundSurface"}, {"type": "RoofSurface"}],
                        "values": [0, 1]
                    }
                }]
            },
            "b2": {
                "type": "Building",
                "attributes": {"roofType": "gabled"},
                "geometry": [{
                    "type": "Solid",
                    "lod": 2,
                    "boundaries": cube(8),
                    "semantics": {
                        "surfaces": [
                            {"type": "GroundSurface"},
                            {"type": "RoofSurface"},
                            {"type": "WallSurface"}
                        ],
                        "values": [[0, 1, 2, 2, 2, 2]]
                    }
                }]
            },
            "bp1": {
                "type": "BuildingPart",
                "parents": ["b1"],
                "attributes": {"function": "garage"},
                "geometry": [{
                    "type": "MultiSurface",
                    "lod": "1",
                    "boundaries": [[[0, 1, 5, 4]]]
                }]
            },
            "t1": {
                "type": "Tunnel",
                "children": ["ti1"],
                "geometry": [{"type": "Solid", "lod": "1", "boundaries": cube(0)}]
            },
            "ti1": {
                "type": "TunnelInstallation",
                "parents": ["t1"],
                "geometry": [{
                    "type": "MultiSurface",
                    "lod": "2",
                    "boundaries": [[[4, 5, 6, 7]]]
                }]
            },
            "tree": {
                "type": "SolitaryVegetationObject",
                "attributes": {"species": "Tilia"},
                "geometry": [geometry::geometry_instance()]
            }
        },
        "geometry-templates": {
            "templates": [{
                "type": "MultiSurface",
                "lod": "2",
                "boundaries": [[[0, 1, 2]]]
            }],
            "vertices-templates": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        }
    })
}

/// A document in a projected CRS; none of its objects get a location.
pub fn projected_document() -> Value {
    json!({
        "type": "CityJSON",
        "version": "1.0",
        "metadata": {"referenceSystem": "urn:ogc:def:crs:EPSG::7415"},
        "transform": {
            "scale": [0.001, 0.001, 0.001],
            "translate": [92000.0, 437000.0, 0.0]
        },
        "vertices": [[0, 0, 0], [1000, 0, 0], [1000, 1000, 0], [0, 1000, 0]],
        "CityObjects": {
            "r1": {
                "type": "Building",
                "attributes": {"roofType": "flat"},
                "geometry": [{"type": "MultiSurface", "lod": "1", "boundaries": [[[0, 1, 2, 3]]]}]
            }
        }
    })
}

/// `count` buildings laid out on a line, for paging tests.
///
/// Building `i` is named `building-{i:04}` and alternates the `district`
/// attribute between `north` and `south`.
pub fn generated_document(count: usize) -> Value {
    let mut vertices = Vec::with_capacity(count * 4);
    let mut objects = serde_json::Map::new();

    for i in 0..count {
        let x = (i * 10) as i64;
        let first = (i * 4) as u32;
        let district = if i % 2 == 0 { "north" } else { "south" };
        vertices.extend([
            json!([x, 0, 0]),
            json!([x + 5, 0, 0]),
            json!([x + 5, 5, 0]),
            json!([x, 5, 0]),
        ]);
        objects.insert(
            format!("building-{:04}", i),
            json!({
                "type": "Building",
                "attributes": {"district": district},
                "geometry": [{
                    "type": "MultiSurface",
                    "lod": "1",
                    "boundaries": [[[first, first + 1, first + 2, first + 3]]]
                }]
            }),
        );
    }

    json!({
        "type": "CityJSON",
        "version": "1.0",
        "metadata": {},
        "transform": {"scale": [0.0001, 0.0001, 0.01], "translate": [4.0, 52.0, 0.0]},
        "vertices": vertices,
        "CityObjects": objects
    })
}
