use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::escape_html;
use crate::node::{JsonMap, str_key};
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// A grouped set of fields under an optional legend.
pub struct FieldsetField;

impl FieldHandler for FieldsetField {
    fn type_names(&self) -> &'static [&'static str] {
        &["fieldset"]
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
        let fields = content
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| FieldError::missing_key(type_name, "fields"))?;

        let rendered: Vec<Value> = fields
            .iter()
            .map(|field| Value::String(walker.render_container_field(ctx, field)))
            .collect();

        let mut data = JsonMap::new();
        if let Some(legend) = str_key(content, "legend") {
            data.insert("legend".into(), Value::String(escape_html(legend)));
        }
        data.insert("fields".into(), Value::Array(rendered));
        Ok(data)
    }
}
