//! Output format negotiation.
//!
//! An explicit `f` parameter wins. Otherwise the `Accept` header is ranked by
//! quality value, and HTML is served when it says nothing useful.

use std::fmt;

use crate::errors::FeaturesError;
use crate::media_types;

/// Representation returned to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    /// Default for browsers and bare requests.
    #[default]
    Html,
}

impl OutputFormat {
    /// Value used for the `f` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }

    /// Content-Type header value for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => media_types::JSON,
            OutputFormat::Html => media_types::HTML,
        }
    }

    /// The other representation, used for `alternate` links.
    pub fn complement(&self) -> Self {
        match self {
            OutputFormat::Json => OutputFormat::Html,
            OutputFormat::Html => OutputFormat::Json,
        }
    }

    /// Parse the `f` query parameter value (case-insensitive).
    pub fn from_query_param(f: &str) -> Option<Self> {
        match f.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "html" => Some(OutputFormat::Html),
            _ => None,
        }
    }

    /// Parse format from an Accept header media type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            media_types::JSON | media_types::GEO_JSON => Some(OutputFormat::Json),
            media_types::HTML => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Negotiate the output format from the `f` parameter and `Accept` header.
///
/// An empty `f` counts as absent. An unrecognized non-empty `f` is an
/// error whatever the `Accept` header says.
pub fn negotiate(f: Option<&str>, accept: Option<&str>) -> Result<OutputFormat, FeaturesError> {
    if let Some(f) = f.filter(|f| !f.is_empty()) {
        return OutputFormat::from_query_param(f).ok_or_else(|| {
            FeaturesError::InvalidParameterValue(format!(
                "f: unsupported format '{}', expected json or html",
                f
            ))
        });
    }

    let Some(accept) = accept else {
        return Ok(OutputFormat::default());
    };

    let mut accepted: Vec<(&str, f32)> = accept
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let media_type = parts.next()?.trim();
            if media_type.is_empty() {
                return None;
            }
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q=").and_then(|q| q.parse::<f32>().ok()))
                .unwrap_or(1.0);
            Some((media_type, quality))
        })
        .collect();

    // Stable sort keeps header order among equal weights.
    accepted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(accepted
        .iter()
        .filter(|(_, q)| *q > 0.0)
        .find_map(|(media_type, _)| OutputFormat::from_media_type(media_type))
        .unwrap_or_default())
}
