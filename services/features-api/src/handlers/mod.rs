//! HTTP request handlers.

pub mod collections;
pub mod conformance;
pub mod health;
pub mod items;
pub mod landing;
