//! The untyped NJN node model.
//!
//! Documents arrive as JSON and stay untyped throughout the walk: a node is a
//! scalar, an ordered list, or a string-keyed object. The helpers here
//! centralise the shape probing every handler would otherwise repeat, plus the
//! top-level decode with positional diagnostics.

use serde_json::Value;
use slug::slugify;

use crate::error::DecodeError;

/// Object-shaped node payload, as produced by `serde_json`.
pub type JsonMap = serde_json::Map<String, Value>;

/// Bytes of context shown on either side of a decode failure.
const SNIPPET_RADIUS: usize = 32;

/// Decode a raw NJN document. Malformed input is fatal to the render; the
/// error carries the byte offset and a marked snippet of the surrounding
/// input so callers can highlight the offending region.
pub fn decode_document(raw: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(raw).map_err(|err| {
        let (line, column) = (err.line(), err.column());
        let offset = byte_offset(raw, line, column);
        DecodeError {
            offset,
            line,
            column,
            message: err.to_string(),
            snippet: snippet_around(raw, offset),
        }
    })
}

fn byte_offset(raw: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let mut offset = 0;
    for (idx, text) in raw.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            return offset + column.saturating_sub(1).min(text.len());
        }
        offset += text.len();
    }
    raw.len()
}

fn snippet_around(raw: &str, offset: usize) -> String {
    let bytes = raw.as_bytes();
    let start = offset.saturating_sub(SNIPPET_RADIUS);
    let end = (offset + SNIPPET_RADIUS).min(bytes.len());
    let before = String::from_utf8_lossy(&bytes[start..offset.min(bytes.len())]);
    let after = String::from_utf8_lossy(&bytes[offset.min(bytes.len())..end]);
    format!("{before}\u{2192}{after}")
}

/// Resolve a node's canonical type name: the `type` key, kebab-normalised.
/// Returns `None` when the node is not an object or carries no usable name.
pub fn type_name_of(node: &JsonMap) -> Option<String> {
    let raw = node.get("type")?.as_str()?;
    let name = normalize_type_name(raw);
    if name.is_empty() { None } else { Some(name) }
}

/// Kebab-normalise a type name so `LinkList`, `link_list` and `link-list`
/// all address the same handler.
pub fn normalize_type_name(raw: &str) -> String {
    slugify(raw.trim())
}

/// The `content` object of a block or field, when present.
pub fn content_of(node: &JsonMap) -> Option<&JsonMap> {
    node.get("content").and_then(Value::as_object)
}

/// A string payload key, trimmed of `None`/non-string noise.
pub fn str_key<'a>(node: &'a JsonMap, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str)
}

/// A list payload key.
pub fn list_key<'a>(node: &'a JsonMap, key: &str) -> Option<&'a [Value]> {
    node.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// An integer payload key. Accepts JSON numbers and numeric strings, since
/// hand-authored documents routinely quote their numbers.
pub fn int_key(node: &JsonMap, key: &str) -> Option<i64> {
    int_value(node.get(key)?)
}

pub fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A boolean payload key. Accepts `true`/`false` and their string forms.
pub fn bool_key(node: &JsonMap, key: &str) -> bool {
    match node.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Extract the plain text of an inline-text payload: a string, or a list
/// whose string items are joined with spaces. Nested field objects contribute
/// their own `content.text` recursively so titles with formatting still
/// produce a usable plain form.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(plain_text)
                .filter(|part| !part.is_empty())
                .collect();
            parts.join(" ")
        }
        Value::Object(map) => content_of(map)
            .and_then(|content| content.get("text"))
            .map(plain_text)
            .unwrap_or_default(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_reports_offset_and_snippet() {
        let raw = "{\"blocks\": [{\"type\": \"content\",}]}";
        let err = decode_document(raw).expect_err("trailing comma must fail");
        assert!(err.offset > 0);
        assert!(err.offset <= raw.len());
        assert!(err.snippet.contains('\u{2192}'));
        assert!(err.snippet.contains("content"));
    }

    #[test]
    fn decode_reports_line_and_column_across_lines() {
        let raw = "{\n  \"blocks\": [\n    oops\n  ]\n}";
        let err = decode_document(raw).expect_err("bare word must fail");
        assert_eq!(err.line, 3);
        assert_eq!(&raw[err.offset..err.offset + 1], "o");
    }

    #[test]
    fn type_names_are_kebab_normalised() {
        assert_eq!(normalize_type_name("LinkList"), "linklist");
        assert_eq!(normalize_type_name("link_list"), "link-list");
        assert_eq!(normalize_type_name("  Link List "), "link-list");
        let node = json!({"type": "Link-List"});
        assert_eq!(
            type_name_of(node.as_object().unwrap()),
            Some("link-list".to_string())
        );
    }

    #[test]
    fn plain_text_joins_lists_and_descends_fields() {
        let value = json!([
            "Getting",
            {"type": "em", "content": {"text": "started"}},
            "quickly"
        ]);
        assert_eq!(plain_text(&value), "Getting started quickly");
    }

    #[test]
    fn int_key_accepts_quoted_numbers() {
        let node = json!({"size": "48", "width": 640.0});
        let map = node.as_object().unwrap();
        assert_eq!(int_key(map, "size"), Some(48));
        assert_eq!(int_key(map, "width"), Some(640));
        assert_eq!(int_key(map, "missing"), None);
    }
}
