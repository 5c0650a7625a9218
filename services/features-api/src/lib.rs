//! Features API Service Library
//!
//! This crate provides the HTTP server implementation of
//! OGC API - Features over imported CityJSON city models.

pub mod config;
pub mod content_negotiation;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
