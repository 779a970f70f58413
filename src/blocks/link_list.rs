use serde_json::{Value, json};
use tracing::debug;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy, escape_html};
use crate::node::{JsonMap, content_of, str_key};
use crate::registry::BlockHandler;
use crate::walker::Walker;

/// A flat navigation list. Entries are either bare `{href, text}` objects or
/// full `anchor` field nodes; malformed entries are logged and skipped so
/// one bad link never takes out the list.
pub struct LinkListBlock;

impl BlockHandler for LinkListBlock {
    fn type_name(&self) -> &'static str {
        "link-list"
    }

    fn prepare(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let content =
            content_of(node).ok_or_else(|| FieldError::missing_key(type_name, "content"))?;
        let links = content
            .get("links")
            .and_then(Value::as_array)
            .ok_or_else(|| FieldError::missing_key(type_name, "links"))?;

        let mut items = Vec::with_capacity(links.len());
        for link in links {
            let Some(map) = link.as_object() else {
                debug!(target: "njn::blocks", "link-list entry is not an object, skipped");
                continue;
            };
            // Anchor field nodes keep their payload under `content`.
            let payload = content_of(map).unwrap_or(map);
            let Some(href) = str_key(payload, "href").filter(|href| !href.trim().is_empty())
            else {
                debug!(target: "njn::blocks", "link-list entry without href, skipped");
                continue;
            };
            let text = match payload.get("text") {
                Some(text) => inline::render_text(walker, ctx, text, InlinePolicy::block_text()),
                None => escape_html(href),
            };
            items.push(json!({"href": href, "text": text}));
        }

        let mut data = JsonMap::new();
        if let Some(header) = super::inline_text(walker, ctx, content, "header") {
            data.insert("header".into(), Value::String(header));
        }
        data.insert("links".into(), Value::Array(items));
        Ok(data)
    }
}
