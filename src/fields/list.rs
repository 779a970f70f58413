use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy};
use crate::node::{JsonMap, bool_key};
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// An ordered or unordered list. Items are inline text or nested container
/// fields, resolved back through the walker so depth accounting holds.
pub struct ListField;

impl FieldHandler for ListField {
    fn type_names(&self) -> &'static [&'static str] {
        &["list"]
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
        let items = content
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| FieldError::missing_key(type_name, "items"))?;

        let rendered: Vec<Value> = items
            .iter()
            .map(|item| {
                let markup = match item {
                    Value::Object(_) => walker.render_container_field(ctx, item),
                    other => inline::render_text(walker, ctx, other, InlinePolicy::block_text()),
                };
                Value::String(markup)
            })
            .collect();

        let mut data = JsonMap::new();
        data.insert("ordered".into(), Value::Bool(bool_key(content, "ordered")));
        data.insert("items".into(), Value::Array(rendered));
        Ok(data)
    }
}
