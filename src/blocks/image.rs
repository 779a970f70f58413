use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::escape_html;
use crate::node::{JsonMap, content_of, int_key, str_key};
use crate::registry::BlockHandler;
use crate::walker::Walker;

/// A standalone figure: source, alt text, optional caption and dimensions.
pub struct ImageBlock;

impl BlockHandler for ImageBlock {
    fn type_name(&self) -> &'static str {
        "image"
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
        let src = str_key(content, "src")
            .filter(|src| !src.trim().is_empty())
            .ok_or_else(|| FieldError::missing_key(type_name, "src"))?;

        let mut data = JsonMap::new();
        data.insert("src".into(), Value::String(src.to_string()));
        if let Some(alt) = str_key(content, "alt") {
            data.insert("alt".into(), Value::String(escape_html(alt)));
        }
        if let Some(caption) = super::inline_text(walker, ctx, content, "caption") {
            data.insert("caption".into(), Value::String(caption));
        }
        for key in ["width", "height"] {
            if let Some(value) = int_key(content, key) {
                data.insert(key.into(), Value::from(value));
            }
        }
        Ok(data)
    }
}
