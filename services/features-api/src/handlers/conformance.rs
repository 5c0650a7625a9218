//! Conformance handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, RawQuery},
    http::HeaderMap,
    response::Response,
};
use cityjson_protocol::{parse_query, ConformanceClasses, RenderKind};
use metrics::counter;

use crate::content_negotiation::{negotiate_format, respond};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /conformance - Conformance classes
pub async fn conformance_handler(
    Extension(state): Extension<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    counter!("features_requests_total", "endpoint" => "conformance").increment(1);

    let params = parse_query(query.as_deref());
    let format = negotiate_format(&headers, &params)?;

    respond(&state, format, RenderKind::Conformance, &ConformanceClasses::current())
}
