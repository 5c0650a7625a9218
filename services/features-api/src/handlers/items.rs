//! Items handlers.
//!
//! Query parameters are validated before the collection is looked up, so a
//! bad `bbox` on an unknown collection is still a 400.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, RawQuery},
    http::HeaderMap,
    response::Response,
};
use cityjson_protocol::{
    build_filter, links, parse_query, FeaturesError, ItemCollection, ItemResponse, RenderKind,
};
use metrics::counter;
use tracing::debug;

use crate::content_negotiation::{negotiate_format, respond};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /collections/:collection_id/items - Filtered page of city objects
pub async fn items_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    counter!("features_requests_total", "endpoint" => "items").increment(1);

    let params = parse_query(query.as_deref());
    let format = negotiate_format(&headers, &params)?;
    let filter = build_filter(&params, &collection_id, &state.config.paging)
        .map_err(FeaturesError::from)?;

    state
        .storage("get_model", state.store.get_model(&collection_id))
        .await?
        .ok_or_else(|| FeaturesError::NoCollectionFound(collection_id.clone()))?;

    let items = state
        .storage("query_objects", state.store.query_objects(&filter))
        .await?;
    debug!(
        collection = %collection_id,
        predicates = filter.equality_predicates.len(),
        bbox = filter.spatial_polygon.is_some(),
        returned = items.len(),
        "Items query"
    );

    if items.is_empty() {
        return Err(FeaturesError::NoItemsFound(collection_id).into());
    }

    let links = links::items_links(&state.config.base_url, &collection_id, query.as_deref(), format);
    let page = ItemCollection::new(collection_id, items, links);

    respond(&state, format, RenderKind::Items, &page)
}

/// GET /collections/:collection_id/items/:item_id - One city object
pub async fn item_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((collection_id, item_id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    counter!("features_requests_total", "endpoint" => "item").increment(1);

    let params = parse_query(query.as_deref());
    let format = negotiate_format(&headers, &params)?;

    state
        .storage("get_model", state.store.get_model(&collection_id))
        .await?
        .ok_or_else(|| FeaturesError::NoCollectionFound(collection_id.clone()))?;

    let item = state
        .storage("get_object", state.store.get_object(&collection_id, &item_id))
        .await?
        .ok_or_else(|| FeaturesError::ItemNotFound {
            collection: collection_id.clone(),
            item: item_id.clone(),
        })?;

    let response = ItemResponse {
        item,
        links: links::item_links(&state.config.base_url, &collection_id, &item_id, format),
    };
    respond(&state, format, RenderKind::Item, &response)
}
