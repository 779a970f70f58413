use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy};
use crate::node::JsonMap;
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// A run of prose. Block-level text, so its inline children are unpoliced.
pub struct ParagraphField;

impl FieldHandler for ParagraphField {
    fn type_names(&self) -> &'static [&'static str] {
        &["paragraph", "p"]
    }

    fn class(&self) -> HandlerClass {
        HandlerClass::Container
    }

    fn prepare_data(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let content = payload(node);
        let text = content
            .get("text")
            .ok_or_else(|| FieldError::missing_key(type_name, "text"))?;

        let mut data = JsonMap::new();
        data.insert(
            "text".into(),
            Value::String(inline::render_text(
                walker,
                ctx,
                text,
                InlinePolicy::block_text(),
            )),
        );
        Ok(data)
    }
}
