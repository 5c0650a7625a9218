//! Format negotiation and response building.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use cityjson_protocol::{negotiate, queries, OutputFormat, RenderKind};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Pick the output format from the `f` parameter and the `Accept` header.
pub fn negotiate_format(
    headers: &HeaderMap,
    params: &[(String, String)],
) -> ApiResult<OutputFormat> {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    Ok(negotiate(queries::first_value(params, "f"), accept)?)
}

/// Render `payload` in `format` as a cacheable 200 response.
pub fn respond<T: Serialize>(
    state: &AppState,
    format: OutputFormat,
    kind: RenderKind,
    payload: &T,
) -> ApiResult<Response> {
    let rendered = cityjson_protocol::render(format, kind, payload, state.renderer.as_ref())?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, rendered.content_type),
            (header::CACHE_CONTROL, "max-age=300"),
        ],
        rendered.body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_f_parameter_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));

        let format = negotiate_format(&headers, &params(&[("f", "json")])).unwrap();
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_accept_header_used_without_f() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/geo+json"));

        let format = negotiate_format(&headers, &params(&[("f", "")])).unwrap();
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_f_rejected() {
        let result = negotiate_format(&HeaderMap::new(), &params(&[("f", "xml")]));
        assert!(result.is_err());
    }
}
