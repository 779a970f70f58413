use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, content_of};
use crate::registry::BlockHandler;
use crate::walker::Walker;

use super::{inline_text, section_markup};

/// The general-purpose prose block: optional header, a list of container
/// sections, optional footer, and whatever footnotes its fields registered.
///
/// Preparation order is a contract, not a convenience: sections first (which
/// is when footnote fields register themselves), then the footnote drain,
/// then the footer. Reordering silently orphans footnotes.
pub struct ContentBlock;

impl BlockHandler for ContentBlock {
    fn type_name(&self) -> &'static str {
        "content"
    }

    fn prepare(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        _type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let block_index = ctx.block_count;
        let mut data = JsonMap::new();
        let Some(content) = content_of(node) else {
            return Ok(data);
        };

        if let Some(header) = inline_text(walker, ctx, content, "header") {
            data.insert("header".into(), Value::String(header));
        }

        data.insert(
            "sections".into(),
            Value::Array(section_markup(walker, ctx, content)),
        );

        if let Some(notes) = super::drained_footnotes(ctx, block_index) {
            data.insert("footnotes".into(), notes);
        }

        if let Some(footer) = inline_text(walker, ctx, content, "footer") {
            data.insert("footer".into(), Value::String(footer));
        }

        Ok(data)
    }
}
