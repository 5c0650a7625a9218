//! Rendering of payloads into response bodies.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::negotiation::OutputFormat;

/// Which page is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Landing,
    Conformance,
    Collections,
    Collection,
    Items,
    Item,
}

impl RenderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderKind::Landing => "landing",
            RenderKind::Conformance => "conformance",
            RenderKind::Collections => "collections",
            RenderKind::Collection => "collection",
            RenderKind::Items => "items",
            RenderKind::Item => "item",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            RenderKind::Landing => "Landing page",
            RenderKind::Conformance => "Conformance",
            RenderKind::Collections => "City models",
            RenderKind::Collection => "City model",
            RenderKind::Items => "City objects",
            RenderKind::Item => "City object",
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered response body with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBody {
    pub content_type: &'static str,
    pub body: String,
}

/// Produces the HTML view of a payload.
pub trait ViewRenderer: Send + Sync {
    fn render_html(&self, kind: RenderKind, payload: &Value) -> String;
}

/// Minimal HTML view: a heading and the pretty-printed payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHtmlRenderer;

impl ViewRenderer for BasicHtmlRenderer {
    fn render_html(&self, kind: RenderKind, payload: &Value) -> String {
        let pretty = serde_json::to_string_pretty(payload).unwrap_or_default();
        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n<h1>{title}</h1>\n<pre>{body}</pre>\n</body>\n</html>\n",
            title = kind.title(),
            body = escape_html(&pretty),
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a payload in the negotiated format.
pub fn render<T: Serialize>(
    format: OutputFormat,
    kind: RenderKind,
    payload: &T,
    renderer: &dyn ViewRenderer,
) -> Result<RenderedBody, serde_json::Error> {
    let body = match format {
        OutputFormat::Json => serde_json::to_string(payload)?,
        OutputFormat::Html => renderer.render_html(kind, &serde_json::to_value(payload)?),
    };
    Ok(RenderedBody {
        content_type: format.content_type(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json() {
        let payload = json!({"title": "Cities"});
        let body = render(OutputFormat::Json, RenderKind::Landing, &payload, &BasicHtmlRenderer).unwrap();

        assert_eq!(body.content_type, "application/json");
        assert_eq!(serde_json::from_str::<Value>(&body.body).unwrap(), payload);
    }

    #[test]
    fn test_render_html_escapes_payload() {
        let payload = json!({"name": "<script>"});
        let body = render(OutputFormat::Html, RenderKind::Item, &payload, &BasicHtmlRenderer).unwrap();

        assert_eq!(body.content_type, "text/html");
        assert!(body.body.contains("<h1>City object</h1>"));
        assert!(body.body.contains("&lt;script&gt;"));
        assert!(!body.body.contains("<script>"));
    }

    struct Fixed;

    impl ViewRenderer for Fixed {
        fn render_html(&self, kind: RenderKind, _payload: &Value) -> String {
            format!("view:{}", kind)
        }
    }

    #[test]
    fn test_custom_renderer() {
        let body = render(OutputFormat::Html, RenderKind::Items, &json!([]), &Fixed).unwrap();
        assert_eq!(body.body, "view:items");
    }
}
