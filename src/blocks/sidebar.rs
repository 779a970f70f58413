use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, content_of};
use crate::registry::BlockHandler;
use crate::walker::{PreparedBlock, Walker};

use super::{inline_text, prepare_block_list, render_prepared_list};

/// An aside carrying its own nested block list. Nested blocks are prepared
/// in document order at depth + 1, so their counters and footnotes land
/// exactly where the document places them while depth-sensitive styling
/// knows it is inside an aside.
pub struct SidebarBlock;

impl BlockHandler for SidebarBlock {
    fn type_name(&self) -> &'static str {
        "sidebar"
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
        let blocks = content
            .get("blocks")
            .and_then(Value::as_array)
            .ok_or_else(|| FieldError::missing_key(type_name, "blocks"))?;

        let mut data = JsonMap::new();
        if let Some(header) = inline_text(walker, ctx, content, "header") {
            data.insert("header".into(), Value::String(header));
        }

        ctx.enter()?;
        let children = prepare_block_list(walker, ctx, blocks);
        ctx.leave();
        data.insert("blocks".into(), Value::Array(children));
        Ok(data)
    }

    fn render(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        prepared: &PreparedBlock,
    ) -> Result<String, FieldError> {
        let markups = render_prepared_list(walker, ctx, prepared.data.get("blocks"));
        let mut data = prepared.data.clone();
        data.insert("blocks".into(), Value::Array(markups));
        walker.render_template(ctx, "block/sidebar", &Value::Object(data))
    }
}
