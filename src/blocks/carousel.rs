use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, content_of};
use crate::registry::BlockHandler;
use crate::walker::{PreparedBlock, Walker};

use super::{prepare_block_list, render_prepared_list};

/// A rotating sequence of nested blocks. Transparent to the outline: its
/// children keep the surrounding heading numbering.
pub struct CarouselBlock;

impl BlockHandler for CarouselBlock {
    fn type_name(&self) -> &'static str {
        "carousel"
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

        ctx.enter()?;
        let children = prepare_block_list(walker, ctx, blocks);
        ctx.leave();

        let mut data = JsonMap::new();
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
        walker.render_template(ctx, "block/carousel", &Value::Object(data))
    }
}
