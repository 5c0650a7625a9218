//! Core types shared by the API payloads.

use serde::{Deserialize, Serialize};

use crate::city::Location;

/// CRS of every coordinate the API returns.
pub const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// A hyperlink to a related resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// The URI of the linked resource.
    pub href: String,

    /// The relationship type (e.g., "self", "alternate", "collection").
    pub rel: String,

    /// The media type of the linked resource.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// A human-readable title for the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Create a new link with required fields.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            type_: None,
            title: None,
        }
    }

    /// Set the media type.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Spatial extent of a set of items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extent {
    pub spatial: SpatialExtent,
}

impl Extent {
    /// Envelope of the given locations, or `None` when there are none.
    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Option<Self> {
        let mut iter = locations.into_iter();
        let first = iter.next()?;
        let init = [first.lon(), first.lat(), first.lon(), first.lat()];
        let [w, s, e, n] = iter.fold(init, |[w, s, e, n], l| {
            [w.min(l.lon()), s.min(l.lat()), e.max(l.lon()), n.max(l.lat())]
        });

        Some(Self {
            spatial: SpatialExtent {
                bbox: vec![[w, s, e, n]],
                crs: CRS84.to_string(),
            },
        })
    }
}

/// Spatial extent with bounding box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialExtent {
    /// Bounding boxes as [west, south, east, north] arrays.
    pub bbox: Vec<[f64; 4]>,

    #[serde(default = "default_crs")]
    pub crs: String,
}

fn default_crs() -> String {
    CRS84.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_builder() {
        let link = Link::new("http://localhost/collections", "data")
            .with_type("application/json")
            .with_title("Collections");

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "application/json");
        assert_eq!(json["title"], "Collections");
    }

    #[test]
    fn test_link_skips_empty_fields() {
        let json = serde_json::to_string(&Link::new("http://x", "self")).unwrap();
        assert!(!json.contains("type"));
        assert!(!json.contains("title"));
    }

    #[test]
    fn test_extent_from_locations() {
        let locations = [
            Location::new(4.3, 52.0),
            Location::new(4.4, 51.9),
            Location::new(4.35, 52.1),
        ];
        let extent = Extent::from_locations(&locations).unwrap();
        assert_eq!(extent.spatial.bbox, vec![[4.3, 51.9, 4.4, 52.1]]);
        assert_eq!(extent.spatial.crs, CRS84);

        assert!(Extent::from_locations(&[]).is_none());
    }
}
