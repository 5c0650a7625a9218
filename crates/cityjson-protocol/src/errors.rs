//! Features API error types.

use thiserror::Error;

use crate::queries::QueryError;
use crate::responses::ErrorEnvelope;

/// Errors that can occur while serving a Features API request.
#[derive(Debug, Error, PartialEq)]
pub enum FeaturesError {
    /// Malformed or out-of-range parameter value.
    #[error("{0}")]
    InvalidParameterValue(String),

    /// Parameter the service does not implement.
    #[error("Parameter '{0}' is not supported")]
    UnsupportedParameter(String),

    /// A 3D bounding box was requested.
    #[error("Only 2D bounding boxes are supported by the spatial index")]
    Only2DSphereSupported,

    /// Collection not found.
    #[error("Collection not found: {0}")]
    NoCollectionFound(String),

    /// The filter matched nothing.
    #[error("No items found in collection {0}")]
    NoItemsFound(String),

    /// Item not found in its collection.
    #[error("Item {item} not found in collection {collection}")]
    ItemNotFound { collection: String, item: String },

    /// Storage could not be reached in time.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Storage answered with an error.
    #[error("Storage error: {0}")]
    StorageFault(String),
}

impl From<QueryError> for FeaturesError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidParameterValue { param, message } => {
                FeaturesError::InvalidParameterValue(format!("{}: {}", param, message))
            }
            QueryError::UnsupportedParameter(param) => FeaturesError::UnsupportedParameter(param),
            QueryError::Only2DSphereSupported => FeaturesError::Only2DSphereSupported,
        }
    }
}

impl FeaturesError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            FeaturesError::InvalidParameterValue(_)
            | FeaturesError::UnsupportedParameter(_)
            | FeaturesError::Only2DSphereSupported => 400,
            FeaturesError::NoCollectionFound(_)
            | FeaturesError::NoItemsFound(_)
            | FeaturesError::ItemNotFound { .. } => 404,
            FeaturesError::StorageFault(_) => 500,
            FeaturesError::StorageUnavailable(_) => 503,
        }
    }

    /// Stable error kind reported in the envelope `code` member.
    pub fn code(&self) -> &'static str {
        match self {
            FeaturesError::InvalidParameterValue(_) => "InvalidParameterValue",
            FeaturesError::UnsupportedParameter(_) => "UnsupportedParameter",
            FeaturesError::Only2DSphereSupported => "Only2DSphereSupported",
            FeaturesError::NoCollectionFound(_) => "NoCollectionFound",
            FeaturesError::NoItemsFound(_) => "NoItemsFound",
            FeaturesError::ItemNotFound { .. } => "ItemNotFound",
            FeaturesError::StorageUnavailable(_) => "StorageUnavailable",
            FeaturesError::StorageFault(_) => "StorageFault",
        }
    }

    /// Convert to the wire error envelope.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.code(), self.to_string())
    }
}
