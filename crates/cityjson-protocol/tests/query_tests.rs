//! Items queries against the Delft fixture.

use cityjson_protocol::{
    build_filter, import_document, links, CityObject, FeaturesError, OutputFormat, PagingLimits,
    QueryError,
};
use test_utils::fixtures;

fn delft_objects() -> Vec<CityObject> {
    import_document(fixtures::DELFT, &fixtures::delft_document())
        .unwrap()
        .objects
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn select(pairs: &[(&str, &str)]) -> Vec<String> {
    let filter = build_filter(&params(pairs), fixtures::DELFT, &PagingLimits::default()).unwrap();
    let mut names: Vec<String> = delft_objects()
        .into_iter()
        .filter(|o| filter.matches(o))
        .map(|o| o.name)
        .collect();
    names.sort();
    names
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_no_params_selects_everything() {
    assert_eq!(select(&[]).len(), fixtures::DELFT_OBJECT_COUNT);
}

#[test]
fn test_bbox_selects_block() {
    assert_eq!(
        select(&[("bbox", fixtures::bbox::FIRST_BLOCK)]),
        vec!["b1", "bp1", "t1", "ti1"]
    );
    assert_eq!(
        select(&[("bbox", fixtures::bbox::SECOND_BLOCK)]),
        vec!["b2", "tree"]
    );
    assert!(select(&[("bbox", fixtures::bbox::EMPTY_AREA)]).is_empty());
}

#[test]
fn test_equality_predicates() {
    assert_eq!(select(&[("type", "Building")]), vec!["b1", "b2"]);
    assert_eq!(select(&[("roofType", "flat")]), vec!["b1"]);
    assert_eq!(
        select(&[("type", "Building"), ("bbox", fixtures::bbox::SECOND_BLOCK)]),
        vec!["b2"]
    );
}

#[test]
fn test_other_collection_never_matches() {
    let filter = build_filter(&[], "Rotterdam", &PagingLimits::default()).unwrap();
    assert!(delft_objects().iter().all(|o| !filter.matches(o)));
}

// ============================================================================
// Parameter errors
// ============================================================================

#[test]
fn test_bbox_errors_map_to_client_errors() {
    for bbox in [fixtures::bbox::BAD_LONGITUDE, fixtures::bbox::INVERTED] {
        let err: FeaturesError = build_filter(&params(&[("bbox", bbox)]), "Delft", &PagingLimits::default())
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "InvalidParameterValue");
        assert_eq!(err.status_code(), 400);
    }

    let err = build_filter(
        &params(&[("bbox", fixtures::bbox::THREE_D)]),
        "Delft",
        &PagingLimits::default(),
    )
    .unwrap_err();
    assert_eq!(err, QueryError::Only2DSphereSupported);
}

#[test]
fn test_limit_zero_and_negative_rejected() {
    for limit in ["0", "-5"] {
        let result = build_filter(&params(&[("limit", limit)]), "Delft", &PagingLimits::default());
        assert!(matches!(result, Err(QueryError::InvalidParameterValue { .. })));
    }
}

#[test]
fn test_custom_max_limit() {
    let limits = PagingLimits {
        default_limit: 5,
        max_limit: 50,
    };
    assert_eq!(build_filter(&[], "Delft", &limits).unwrap().limit, 5);
    assert!(build_filter(&params(&[("limit", "51")]), "Delft", &limits).is_err());
}

// ============================================================================
// Links
// ============================================================================

#[test]
fn test_items_links_keep_filter() {
    let query = "bbox=4.3,51.9,4.4,52.05&roofType=flat&f=json";
    let links = links::items_links("http://localhost:8080", "Delft", Some(query), OutputFormat::Json);

    let self_link = &links[0];
    let alternate = &links[1];
    assert_eq!(self_link.rel, "self");
    assert_eq!(alternate.rel, "alternate");
    assert!(self_link.href.contains("roofType=flat"));
    assert!(alternate.href.contains("roofType=flat"));
    assert!(self_link.href.ends_with("f=json"));
    assert!(alternate.href.ends_with("f=html"));
}
