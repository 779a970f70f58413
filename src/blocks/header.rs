use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy};
use crate::node::{JsonMap, content_of, plain_text, str_key};
use crate::registry::BlockHandler;
use crate::walker::Walker;

/// A standalone heading. The only block that moves the heading state
/// machine: it evaluates its `heading-reset`/`heading-level` directives
/// through the shared evaluator, counts itself, and nests subsequent
/// content one level deeper unless it explicitly reset.
pub struct HeaderBlock;

impl BlockHandler for HeaderBlock {
    fn type_name(&self) -> &'static str {
        "header"
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
        let title = content
            .get("header")
            .ok_or_else(|| FieldError::missing_key(type_name, "header"))?;

        let text = inline::render_text(walker, ctx, title, InlinePolicy::block_text());
        let plain = plain_text(title);
        if plain.is_empty() && text.is_empty() {
            return Err(FieldError::invalid_value(type_name, "header", "non-empty text"));
        }

        let eval = ctx.headings.advance(content);
        let anchor = match str_key(node, "tag") {
            Some(tag) => tag.to_string(),
            None => ctx.anchor_for(&plain),
        };

        let mut data = JsonMap::new();
        data.insert("text".into(), Value::String(text));
        data.insert("level".into(), Value::from(eval.level));
        data.insert("anchor".into(), Value::String(anchor));
        Ok(data)
    }
}
