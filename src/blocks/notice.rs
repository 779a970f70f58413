use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, content_of, str_key};
use crate::registry::BlockHandler;
use crate::walker::Walker;

use super::{inline_text, section_markup};

const KINDS: &[&str] = &["info", "success", "warning", "danger"];

/// A highlighted admonition wrapping its own sections.
pub struct NoticeBlock;

impl BlockHandler for NoticeBlock {
    fn type_name(&self) -> &'static str {
        "notice"
    }

    fn prepare(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let block_index = ctx.block_count;
        let content =
            content_of(node).ok_or_else(|| FieldError::missing_key(type_name, "content"))?;

        let kind = match str_key(content, "notice-type") {
            Some(value) if KINDS.contains(&value) => value,
            Some(value) => {
                return Err(FieldError::out_of_range(
                    type_name,
                    "notice-type",
                    value,
                    "info|success|warning|danger",
                ));
            }
            None => "info",
        };

        let mut data = JsonMap::new();
        data.insert("notice-type".into(), Value::String(kind.to_string()));
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
        Ok(data)
    }
}
