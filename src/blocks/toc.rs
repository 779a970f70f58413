use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, bool_key, content_of, plain_text, str_key};
use crate::registry::BlockHandler;
use crate::toc::{FlatItem, collect, nest};
use crate::walker::{PreparedBlock, Walker};

/// The table-of-contents block. The only handler that looks outside its own
/// subtree: at render time it flattens heading observations across the
/// entire document root and nests them into an outline.
pub struct TocBlock;

impl BlockHandler for TocBlock {
    fn type_name(&self) -> &'static str {
        "toc"
    }

    fn prepare(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        _type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let mut data = JsonMap::new();
        let Some(content) = content_of(node) else {
            return Ok(data);
        };

        data.insert(
            "include-self".into(),
            Value::Bool(bool_key(content, "include-self")),
        );
        if let Some(header) = super::inline_text(walker, ctx, content, "header") {
            data.insert("header".into(), Value::String(header));
        }
        if let Some(title) = content.get("header").map(plain_text) {
            if !title.is_empty() {
                data.insert("title".into(), Value::String(title));
            }
        }
        Ok(data)
    }

    fn render(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        prepared: &PreparedBlock,
    ) -> Result<String, FieldError> {
        // Built fresh on every render; the outline is never persisted.
        let mut flat = collect(ctx.document_root);

        let include_self = prepared
            .data
            .get("include-self")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if include_self {
            if let Some(title) = str_key(&prepared.data, "title") {
                let tag = str_key(&prepared.data, "anchor").unwrap_or_default();
                let level = prepared
                    .data
                    .get("heading-level")
                    .and_then(Value::as_i64)
                    .unwrap_or(1);
                flat.insert(
                    0,
                    FlatItem {
                        tag: tag.to_string(),
                        title: title.to_string(),
                        level,
                    },
                );
            }
        }

        let items = nest(flat);
        let mut data = prepared.data.clone();
        data.insert(
            "items".into(),
            serde_json::to_value(items).unwrap_or_default(),
        );
        walker.render_template(ctx, "block/toc", &Value::Object(data))
    }
}
