//! Features API response types.
//!
//! This module contains types for the landing page, conformance
//! declaration and error envelope.

use serde::{Deserialize, Serialize};

use crate::conformance;
use crate::types::Link;

/// Landing page response for the API root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingPage {
    /// Title of the API.
    pub title: String,

    /// Description of the API.
    pub description: String,

    /// Links to related resources.
    pub links: Vec<Link>,
}

impl LandingPage {
    /// Create a new landing page with standard links.
    pub fn new(title: impl Into<String>, description: impl Into<String>, base_url: &str) -> Self {
        let links = vec![
            Link::new(base_url, "self")
                .with_type("application/json")
                .with_title("This document"),
            Link::new(format!("{}/conformance", base_url), "conformance")
                .with_type("application/json")
                .with_title("Conformance classes"),
            Link::new(format!("{}/collections", base_url), "data")
                .with_type("application/json")
                .with_title("City models"),
        ];

        Self {
            title: title.into(),
            description: description.into(),
            links,
        }
    }
}

/// Conformance declaration response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConformanceClasses {
    /// List of conformance class URIs.
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
}

impl ConformanceClasses {
    /// Conformance classes of this service: core, HTML, OpenAPI 3.0, GeoJSON.
    pub fn current() -> Self {
        Self {
            conforms_to: [
                conformance::CORE,
                conformance::HTML,
                conformance::OAS30,
                conformance::GEOJSON,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    /// Check if a conformance class is declared.
    pub fn contains(&self, class: &str) -> bool {
        self.conforms_to.iter().any(|c| c == class)
    }
}

/// Body of every error response: `{"error": {"code", "description"}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Error kind, e.g. `InvalidParameterValue`.
    pub code: String,

    /// Human-readable message.
    pub description: String,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                description: description.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page_links() {
        let landing = LandingPage::new("3D city models", "CityJSON features", "http://localhost:8080");

        let rels: Vec<&str> = landing.links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "conformance", "data"]);
        assert_eq!(landing.links[2].href, "http://localhost:8080/collections");
    }

    #[test]
    fn test_conformance_classes() {
        let conf = ConformanceClasses::current();
        assert_eq!(conf.conforms_to.len(), 4);
        assert!(conf.contains(conformance::CORE));
        assert!(conf.contains(conformance::GEOJSON));

        let json = serde_json::to_value(&conf).unwrap();
        assert!(json["conformsTo"].is_array());
    }

    #[test]
    fn test_error_envelope_serialization() {
        let envelope = ErrorEnvelope::new("NoItemsFound", "nothing here");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({"error": {"code": "NoItemsFound", "description": "nothing here"}})
        );
    }
}
