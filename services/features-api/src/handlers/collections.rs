//! Collection handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, RawQuery},
    http::HeaderMap,
    response::Response,
};
use cityjson_protocol::{parse_query, CollectionList, CollectionSummary, FeaturesError, RenderKind};
use metrics::counter;

use crate::content_negotiation::{negotiate_format, respond};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /collections - List every imported city model
pub async fn list_collections_handler(
    Extension(state): Extension<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    counter!("features_requests_total", "endpoint" => "collections").increment(1);

    let params = parse_query(query.as_deref());
    let format = negotiate_format(&headers, &params)?;

    let models = state.storage("list_models", state.store.list_models()).await?;
    let list = CollectionList::new(&models, &state.config.base_url);

    respond(&state, format, RenderKind::Collections, &list)
}

/// GET /collections/:collection_id - Describe one city model
pub async fn get_collection_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    counter!("features_requests_total", "endpoint" => "collection").increment(1);

    let params = parse_query(query.as_deref());
    let format = negotiate_format(&headers, &params)?;

    let model = state
        .storage("get_model", state.store.get_model(&collection_id))
        .await?
        .ok_or(FeaturesError::NoCollectionFound(collection_id))?;

    let summary = CollectionSummary::from_model(&model, &state.config.base_url);
    respond(&state, format, RenderKind::Collection, &summary)
}
