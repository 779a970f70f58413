//! End-to-end rendering properties, exercised through a stub theme and a
//! hand-written template executor so assertions can target real markup.

use std::sync::Arc;

use serde_json::{Value, json};

use njn::{
    Engine, EngineConfig, EngineError, NoShortcodes, RenderContext, TemplateEngine, TemplateError,
    TemplateStore, ThemeSource, Walker, default_registry,
};

/// A theme that carries a template for every conventional name; the stub
/// engine below keys off the name, not the source.
struct UniversalTheme;

impl ThemeSource for UniversalTheme {
    fn template_source(&self, name: &str) -> Option<String> {
        Some(name.to_string())
    }
}

/// Deterministic markup per template name, standing in for the host's real
/// template service.
struct MarkupEngine;

fn text(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn joined(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

fn footnote_list(data: &Value) -> String {
    let Some(notes) = data.get("footnotes").and_then(Value::as_array) else {
        return String::new();
    };
    let mut out = String::from("<ol class=\"footnotes\">");
    for note in notes {
        out.push_str(&format!(
            "<li id=\"{}\">{}</li>",
            text(note, "anchor"),
            text(note, "text")
        ));
    }
    out.push_str("</ol>");
    out
}

fn toc_items(items: &Value) -> String {
    let Some(items) = items.as_array() else {
        return String::new();
    };
    if items.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            text(item, "tag"),
            text(item, "title")
        ));
        out.push_str(&toc_items(&item["children"]));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

impl TemplateEngine for MarkupEngine {
    fn render(&self, name: &str, _source: &str, data: &Value) -> Result<String, TemplateError> {
        let markup = match name {
            "block-list" => joined(data, "blocks"),
            "block/header" => {
                let level = data["level"].as_i64().unwrap_or(2);
                format!(
                    "<h{level} id=\"{}\">{}</h{level}>",
                    text(data, "anchor"),
                    text(data, "text")
                )
            }
            "block/content" => {
                let mut out = String::from("<section>");
                if let Some(header) = data.get("header").and_then(Value::as_str) {
                    let level = data["heading-level"].as_i64().unwrap_or(2);
                    out.push_str(&format!(
                        "<h{level} id=\"{}\">{header}</h{level}>",
                        text(data, "anchor")
                    ));
                }
                out.push_str(&joined(data, "sections"));
                out.push_str(&footnote_list(data));
                if let Some(footer) = data.get("footer").and_then(Value::as_str) {
                    out.push_str(&format!("<footer>{footer}</footer>"));
                }
                out.push_str("</section>");
                out
            }
            "block/sidebar" => format!(
                "<aside>{}{}</aside>",
                data.get("header")
                    .and_then(Value::as_str)
                    .map(|header| format!("<h2>{header}</h2>"))
                    .unwrap_or_default(),
                joined(data, "blocks")
            ),
            "block/carousel" => format!("<div class=\"carousel\">{}</div>", joined(data, "blocks")),
            "block/pair" => format!(
                "<div class=\"pair\">{}{}</div>",
                text(data, "first"),
                text(data, "second")
            ),
            "block/toc" => format!("<nav class=\"toc\">{}</nav>", toc_items(&data["items"])),
            "block/image" => format!("<figure><img src=\"{}\"></figure>", text(data, "src")),
            "block/icon" => format!(
                "<span class=\"icon icon-{} align-{}\"></span>",
                text(data, "icon"),
                text(data, "alignment")
            ),
            "block/notice" => format!(
                "<div class=\"notice notice-{}\">{}{}</div>",
                text(data, "notice-type"),
                joined(data, "sections"),
                footnote_list(data)
            ),
            "block/link-list" => {
                let links = data["links"]
                    .as_array()
                    .map(|links| {
                        links
                            .iter()
                            .map(|link| {
                                format!(
                                    "<li><a href=\"{}\">{}</a></li>",
                                    text(link, "href"),
                                    text(link, "text")
                                )
                            })
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                format!("<nav><ul>{links}</ul></nav>")
            }
            "field/paragraph" => format!("<p>{}</p>", text(data, "text")),
            "field/anchor" => format!(
                "<a href=\"{}\">{}</a>",
                text(data, "href"),
                text(data, "text")
            ),
            "field/footnote" => format!(
                "<sup><a href=\"#{}\">{}</a></sup>",
                text(data, "anchor"),
                data["number"]
            ),
            "field/code" => format!("<pre><code>{}</code></pre>", text(data, "text")),
            "field/details" => format!(
                "<details><summary>{}</summary>{}</details>",
                text(data, "summary"),
                joined(data, "body")
            ),
            "field/list" => {
                let tag = if data["ordered"].as_bool().unwrap_or(false) {
                    "ol"
                } else {
                    "ul"
                };
                let items = data["items"]
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(|item| format!("<li>{item}</li>"))
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                format!("<{tag}>{items}</{tag}>")
            }
            "field/error" => format!("<span class=\"njn-error\">{}</span>", text(data, "message")),
            name if name.starts_with("field/") => {
                // Formatting tags and the rest share one shape.
                let tag = text(data, "tag");
                if tag.is_empty() {
                    format!("<span data-field=\"{name}\">{}</span>", text(data, "text"))
                } else if data.get("text").is_some() {
                    format!("<{tag}>{}</{tag}>", text(data, "text"))
                } else {
                    format!("<{tag}>")
                }
            }
            _ => String::new(),
        };
        Ok(markup)
    }
}

fn engine() -> Engine {
    Engine::new(Arc::new(UniversalTheme), Arc::new(MarkupEngine))
}

fn render(document: Value) -> String {
    engine().render_value(&document).markup
}

#[test]
fn lone_header_is_h1_regardless_of_position() {
    let markup = render(json!([
        {"type": "image", "content": {"src": "/cover.png"}},
        {"type": "icon", "content": {"icon": "star"}},
        {"type": "header", "content": {"header": "The Title"}}
    ]));
    assert!(markup.contains("<h1 id=\"the-title\">The Title</h1>"));
    assert_eq!(markup.matches("<h1").count(), 1);
}

#[test]
fn plain_headers_render_one_then_twos() {
    let markup = render(json!([
        {"type": "header", "content": {"header": "First"}},
        {"type": "header", "content": {"header": "Second"}},
        {"type": "header", "content": {"header": "Third"}}
    ]));
    assert!(markup.contains("<h1 id=\"first\">First</h1>"));
    assert!(markup.contains("<h2 id=\"second\">Second</h2>"));
    assert!(markup.contains("<h2 id=\"third\">Third</h2>"));
    assert_eq!(markup.matches("<h1").count(), 1);
}

#[test]
fn heading_reset_one_forces_h1_every_time() {
    let markup = render(json!([
        {"type": "header", "content": {"header": "First", "heading-reset": 1}},
        {"type": "header", "content": {"header": "Middle"}},
        {"type": "header", "content": {"header": "Again", "heading-reset": 1}}
    ]));
    assert!(markup.contains("<h1 id=\"first\">First</h1>"));
    assert!(markup.contains("<h2 id=\"middle\">Middle</h2>"));
    assert!(markup.contains("<h1 id=\"again\">Again</h1>"));
}

#[test]
fn first_titled_block_claims_the_h1_slot() {
    let markup = render(json!([
        {"type": "content", "content": {"header": "Opening Prose", "sections": []}},
        {"type": "header", "content": {"header": "Real Header"}}
    ]));
    assert!(markup.contains("<h1 id=\"opening-prose\">Opening Prose</h1>"));
    assert!(markup.contains("<h2 id=\"real-header\">Real Header</h2>"));
    assert_eq!(markup.matches("<h1").count(), 1);
}

#[test]
fn footnotes_drain_in_encounter_order() {
    let markup = render(json!([{
        "type": "content",
        "content": {
            "sections": [{
                "type": "paragraph",
                "content": {"text": [
                    "Claim one",
                    {"type": "footnote", "content": {"text": "first source"}},
                    " and claim two",
                    {"type": "footnote", "content": {"text": "second source"}}
                ]}
            }]
        }
    }]));

    assert!(markup.contains("<sup><a href=\"#fn-1-1\">1</a></sup>"));
    assert!(markup.contains("<sup><a href=\"#fn-1-2\">2</a></sup>"));
    let first = markup.find("<li id=\"fn-1-1\">first source</li>").unwrap();
    let second = markup.find("<li id=\"fn-1-2\">second source</li>").unwrap();
    assert!(first < second);
}

#[test]
fn footnotes_stay_with_their_own_block() {
    let markup = render(json!([
        {"type": "content", "content": {"sections": [{
            "type": "paragraph",
            "content": {"text": [{"type": "footnote", "content": {"text": "alpha"}}]}
        }]}},
        {"type": "content", "content": {"sections": [{
            "type": "paragraph",
            "content": {"text": [{"type": "footnote", "content": {"text": "beta"}}]}
        }]}}
    ]));
    assert!(markup.contains("<li id=\"fn-1-1\">alpha</li>"));
    assert!(markup.contains("<li id=\"fn-2-1\">beta</li>"));
}

#[test]
fn toc_outline_uses_single_parent_nesting() {
    let markup = render(json!([
        {"type": "toc"},
        {"type": "header", "content": {"header": "Title"}},
        {"type": "header", "content": {"header": "One"}},
        {"type": "header", "content": {"header": "Two", "heading-reset": 3}},
        {"type": "header", "content": {"header": "Three", "heading-reset": 2}}
    ]));

    // H1 suppressed; level 3 chains under level 2; the trailing level 2
    // starts a new top-level entry.
    assert!(!markup.contains(">Title</a>"));
    assert!(markup.contains(
        "<li><a href=\"#one\">One</a><ul><li><a href=\"#two\">Two</a></li></ul></li>"
    ));
    assert!(markup.contains("<li><a href=\"#three\">Three</a></li>"));
}

#[test]
fn toc_include_self_prepends_its_own_heading() {
    let markup = render(json!([
        {"type": "toc", "content": {"header": "Contents", "include-self": true}},
        {"type": "header", "content": {"header": "Title"}},
        {"type": "header", "content": {"header": "Section"}}
    ]));
    let contents = markup.find(">Contents</a>").expect("own heading listed");
    let section = markup.find(">Section</a>").expect("section listed");
    assert!(contents < section);
}

#[test]
fn unsupported_block_becomes_inline_error_block() {
    let markup = render(json!([
        {"type": "content", "content": {"sections": [
            {"type": "paragraph", "content": {"text": "before"}}
        ]}},
        {"type": "nonexistent-block", "content": {"payload": 7}},
        {"type": "content", "content": {"sections": [
            {"type": "paragraph", "content": {"text": "after"}}
        ]}}
    ]));

    assert!(markup.contains("<p>before</p>"));
    assert!(markup.contains("<p>after</p>"));
    assert!(markup.contains("Unable to render block"));
    assert!(markup.contains("nonexistent-block"));
    // The offending node itself rides along inside the collapsible payload.
    assert!(markup.contains("<details>"));
}

#[test]
fn container_field_in_inline_text_is_dropped_silently() {
    let markup = render(json!([{
        "type": "content",
        "content": {"sections": [{
            "type": "paragraph",
            "content": {"text": [
                "click ",
                {"type": "anchor", "content": {
                    "href": "/docs",
                    "text": ["go ", {"type": "table", "content": {"rows": []}}]
                }}
            ]}
        }]}
    }]));

    assert!(markup.contains("<a href=\"/docs\">go </a>"));
    assert!(!markup.contains("table"));
    assert!(!markup.contains("njn-error"));
}

#[test]
fn anchor_rejects_nested_anchor_but_keeps_formatting() {
    let markup = render(json!([{
        "type": "content",
        "content": {"sections": [{
            "type": "paragraph",
            "content": {"text": [{
                "type": "anchor",
                "content": {"href": "/x", "text": [
                    {"type": "em", "content": {"text": "fine"}},
                    {"type": "anchor", "content": {"href": "/y", "text": "denied"}}
                ]}
            }]}
        }]}
    }]));

    assert!(markup.contains("<em>fine</em>"));
    assert!(!markup.contains("/y"));
    assert!(!markup.contains("denied"));
}

#[test]
fn sidebar_renders_nested_blocks_in_document_order() {
    let markup = render(json!([
        {"type": "header", "content": {"header": "Title"}},
        {"type": "sidebar", "content": {
            "header": "Related",
            "blocks": [
                {"type": "content", "content": {"sections": [
                    {"type": "paragraph", "content": {"text": "inside"}}
                ]}}
            ]
        }}
    ]));
    assert!(markup.contains("<aside><h2>Related</h2><section><p>inside</p></section></aside>"));
}

#[test]
fn redirect_suppresses_markup() {
    let result = engine().render_value(&json!([
        {"type": "content", "redirect": "/moved-here", "content": {}}
    ]));
    assert_eq!(result.redirect.as_deref(), Some("/moved-here"));
    assert!(result.markup.is_empty());
}

#[test]
fn redirect_on_a_nested_block_surfaces() {
    let result = engine().render_value(&json!([
        {"type": "sidebar", "content": {"blocks": [
            {"type": "content", "redirect": "/moved-here", "content": {}}
        ]}}
    ]));
    assert_eq!(result.redirect.as_deref(), Some("/moved-here"));
    assert!(result.markup.is_empty());
}

#[test]
fn earliest_redirect_in_document_order_wins() {
    let result = engine().render_value(&json!([
        {"type": "content", "redirect": "/first", "content": {}},
        {"type": "content", "redirect": "/second", "content": {}}
    ]));
    assert_eq!(result.redirect.as_deref(), Some("/first"));
}

#[test]
fn sidebar_children_prepare_nested_and_depth_restores() {
    let document = json!([
        {"type": "sidebar", "content": {"blocks": [
            {"type": "content", "padding": 2, "content": {"sections": []}}
        ]}},
        {"type": "content", "padding": 1, "content": {"sections": []}}
    ]);
    let registry = default_registry();
    let store = TemplateStore::new(Arc::new(UniversalTheme));
    let templates = MarkupEngine;
    let shortcodes = NoShortcodes;
    let config = EngineConfig::default();
    let mut ctx = RenderContext::new(&document, config.max_depth);
    let walker = Walker::new(registry.as_ref(), &store, &templates, &shortcodes, &config);

    let sidebar = walker.prepare_block(&mut ctx, &document[0]);
    let child = &sidebar.data["blocks"][0]["data"];
    assert_eq!(child["nested"], json!(true));
    assert!(child.get("padding").is_none());
    assert_eq!(ctx.depth(), 0);

    let after = walker.prepare_block(&mut ctx, &document[1]);
    assert_eq!(after.data["nested"], json!(false));
    assert_eq!(after.data["padding"], json!(1));
}

#[test]
fn notice_drains_its_own_footnotes() {
    let markup = render(json!([{
        "type": "notice",
        "content": {"sections": [{
            "type": "paragraph",
            "content": {"text": ["claim", {"type": "footnote", "content": {"text": "cited"}}]}
        }]}
    }]));
    assert!(markup.contains("<sup><a href=\"#fn-1-1\">1</a></sup>"));
    assert!(markup.contains("<li id=\"fn-1-1\">cited</li>"));
}

#[test]
fn two_renders_are_byte_identical() {
    let document = json!([
        {"type": "toc"},
        {"type": "header", "content": {"header": "Title"}},
        {"type": "header", "content": {"header": "Repeat"}},
        {"type": "header", "content": {"header": "Repeat"}},
        {"type": "content", "content": {
            "header": "Prose",
            "sections": [{"type": "paragraph", "content": {"text": [
                "note", {"type": "footnote", "content": {"text": "ref"}}
            ]}}]
        }}
    ]);
    let engine = engine();
    let first = engine.render_value(&document);
    let second = engine.render_value(&document);
    assert_eq!(first, second);
}

#[test]
fn malformed_document_reports_position() {
    let raw = "[{\"type\": \"content\", }]";
    let err = engine().render(raw).expect_err("must not decode");
    let EngineError::Decode(decode) = err;
    assert!(decode.offset > 0);
    assert!(decode.snippet.contains("content"));
}

#[test]
fn pair_and_carousel_render_children() {
    let markup = render(json!([
        {"type": "pair", "content": {
            "first": {"type": "icon", "content": {"icon": "sun"}},
            "second": {"type": "icon", "content": {"icon": "moon"}}
        }},
        {"type": "carousel", "content": {"blocks": [
            {"type": "image", "content": {"src": "/a.png"}},
            {"type": "image", "content": {"src": "/b.png"}}
        ]}}
    ]));
    assert!(markup.contains("icon-sun"));
    assert!(markup.contains("icon-moon"));
    assert!(markup.contains("<img src=\"/a.png\">"));
    assert!(markup.contains("<img src=\"/b.png\">"));
}

#[test]
fn invalid_enum_value_degrades_to_error_block() {
    let markup = render(json!([
        {"type": "icon", "content": {"icon": "star", "alignment": "diagonal"}},
        {"type": "icon", "content": {"icon": "star", "alignment": "center"}}
    ]));
    assert!(markup.contains("diagonal"));
    assert!(markup.contains("Unable to render block"));
    assert!(markup.contains("align-center"));
}
