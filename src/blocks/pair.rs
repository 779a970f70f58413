use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, content_of};
use crate::registry::BlockHandler;
use crate::walker::{PreparedBlock, Walker};

/// Two nested blocks rendered side by side. Transparent to the outline.
pub struct PairBlock;

impl BlockHandler for PairBlock {
    fn type_name(&self) -> &'static str {
        "pair"
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
        let first = content
            .get("first")
            .ok_or_else(|| FieldError::missing_key(type_name, "first"))?;
        let second = content
            .get("second")
            .ok_or_else(|| FieldError::missing_key(type_name, "second"))?;

        ctx.enter()?;
        let first = walker.prepare_block(ctx, first).to_value();
        let second = walker.prepare_block(ctx, second).to_value();
        ctx.leave();

        let mut data = JsonMap::new();
        data.insert("first".into(), first);
        data.insert("second".into(), second);
        Ok(data)
    }

    fn render(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        prepared: &PreparedBlock,
    ) -> Result<String, FieldError> {
        let mut data = prepared.data.clone();
        for key in ["first", "second"] {
            let markup = prepared
                .data
                .get(key)
                .and_then(PreparedBlock::from_value)
                .map(|block| walker.render_prepared_block(ctx, &block))
                .unwrap_or_default();
            data.insert(key.into(), Value::String(markup));
        }
        walker.render_template(ctx, "block/pair", &Value::Object(data))
    }
}
