//! Landing page handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, RawQuery},
    http::HeaderMap,
    response::Response,
};
use cityjson_protocol::{parse_query, LandingPage, RenderKind};
use metrics::counter;

use crate::content_negotiation::{negotiate_format, respond};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET / - Landing page
pub async fn landing_handler(
    Extension(state): Extension<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    counter!("features_requests_total", "endpoint" => "landing").increment(1);

    let params = parse_query(query.as_deref());
    let format = negotiate_format(&headers, &params)?;

    let landing = LandingPage::new(
        &state.config.title,
        &state.config.description,
        &state.config.base_url,
    );
    respond(&state, format, RenderKind::Landing, &landing)
}
