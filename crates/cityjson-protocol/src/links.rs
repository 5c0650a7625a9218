//! Link construction for collections and items.

use url::form_urlencoded;

use crate::negotiation::OutputFormat;
use crate::types::Link;

/// Rebuild a query string with `f` set to `format`.
///
/// Pair order is preserved: the first `f` is replaced in place, any later
/// `f` pairs are dropped, and `f` is appended when missing.
pub fn query_with_format(raw_query: Option<&str>, format: OutputFormat) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut replaced = false;

    for (key, value) in form_urlencoded::parse(raw_query.unwrap_or_default().as_bytes()) {
        if key == "f" {
            if !replaced {
                serializer.append_pair("f", format.as_str());
                replaced = true;
            }
        } else {
            serializer.append_pair(&key, &value);
        }
    }
    if !replaced {
        serializer.append_pair("f", format.as_str());
    }

    serializer.finish()
}

/// Percent-encode an id for use as one path segment.
///
/// `byte_serialize` escapes a literal `+` as `%2B`, so every `+` it emits
/// stands for a space.
fn segment(id: &str) -> String {
    form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn href(path: &str, raw_query: Option<&str>, format: OutputFormat) -> String {
    format!("{}?{}", path, query_with_format(raw_query, format))
}

/// `self`, `alternate` and `collection` links for an items page.
pub fn items_links(
    base_url: &str,
    collection_id: &str,
    raw_query: Option<&str>,
    current: OutputFormat,
) -> Vec<Link> {
    let collection = format!("{}/collections/{}", base_url, segment(collection_id));
    let path = format!("{}/items", collection);
    let alternate = current.complement();

    vec![
        Link::new(href(&path, raw_query, current), "self")
            .with_type(current.content_type())
            .with_title("This document"),
        Link::new(href(&path, raw_query, alternate), "alternate")
            .with_type(alternate.content_type())
            .with_title(format!("This document as {}", alternate.as_str().to_uppercase())),
        Link::new(collection, "collection")
            .with_type(OutputFormat::Json.content_type())
            .with_title(collection_id),
    ]
}

/// Links for a single item.
pub fn item_links(
    base_url: &str,
    collection_id: &str,
    item_id: &str,
    current: OutputFormat,
) -> Vec<Link> {
    let collection = format!("{}/collections/{}", base_url, segment(collection_id));
    let path = format!("{}/items/{}", collection, segment(item_id));
    let alternate = current.complement();

    vec![
        Link::new(href(&path, None, current), "self").with_type(current.content_type()),
        Link::new(href(&path, None, alternate), "alternate").with_type(alternate.content_type()),
        Link::new(collection, "collection").with_type(OutputFormat::Json.content_type()),
    ]
}

/// Links for a collection description.
pub fn collection_links(base_url: &str, collection_id: &str) -> Vec<Link> {
    let path = format!("{}/collections/{}", base_url, segment(collection_id));
    vec![
        Link::new(path.clone(), "self").with_type(OutputFormat::Json.content_type()),
        Link::new(format!("{}/items", path), "items")
            .with_type(OutputFormat::Json.content_type())
            .with_title("City objects"),
    ]
}
