//! Collection and item payloads.
//!
//! Every imported city model is one collection; its city objects are the
//! collection's items.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::city::{CityModel, CityObject};
use crate::links;
use crate::types::{Extent, Link, CRS84};

/// A list of collections available from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionList {
    /// Links to related resources.
    pub links: Vec<Link>,

    /// The collections.
    pub collections: Vec<CollectionSummary>,
}

impl CollectionList {
    /// Create a new collection list.
    pub fn new(models: &[CityModel], base_url: &str) -> Self {
        Self {
            links: vec![Link::new(format!("{}/collections", base_url), "self")
                .with_type("application/json")],
            collections: models
                .iter()
                .map(|m| CollectionSummary::from_model(m, base_url))
                .collect(),
        }
    }
}

/// Description of one city model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSummary {
    /// Collection id, the model name.
    pub name: String,

    pub metadata: Value,

    pub links: Vec<Link>,
}

impl CollectionSummary {
    pub fn from_model(model: &CityModel, base_url: &str) -> Self {
        Self {
            name: model.name.clone(),
            metadata: model.metadata.clone(),
            links: links::collection_links(base_url, &model.name),
        }
    }
}

/// One page of city objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemCollection {
    /// Collection id.
    pub id: String,

    pub links: Vec<Link>,

    /// Envelope of the located items on this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,

    /// Always `"feature"`.
    #[serde(rename = "itemType")]
    pub item_type: String,

    pub crs: Vec<String>,

    pub items: Vec<CityObject>,
}

impl ItemCollection {
    pub fn new(collection_id: impl Into<String>, items: Vec<CityObject>, links: Vec<Link>) -> Self {
        let extent = Extent::from_locations(items.iter().filter_map(|i| i.location.as_ref()));
        Self {
            id: collection_id.into(),
            links,
            extent,
            item_type: "feature".to_string(),
            crs: vec![CRS84.to_string()],
            items,
        }
    }
}

/// A single city object with its links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: CityObject,

    pub links: Vec<Link>,
}
