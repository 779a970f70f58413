use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy};
use crate::node::JsonMap;
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// A collapsible disclosure: summary text plus nested body fields. Also the
/// vehicle for the walker's inline error blocks.
pub struct DetailsField;

impl FieldHandler for DetailsField {
    fn type_names(&self) -> &'static [&'static str] {
        &["details"]
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
        let summary = content
            .get("summary")
            .ok_or_else(|| FieldError::missing_key(type_name, "summary"))?;

        let body: Vec<Value> = content
            .get("body")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| Value::String(walker.render_container_field(ctx, item)))
                    .collect()
            })
            .unwrap_or_default();

        let mut data = JsonMap::new();
        data.insert(
            "summary".into(),
            Value::String(inline::render_text(
                walker,
                ctx,
                summary,
                InlinePolicy::block_text(),
            )),
        );
        data.insert("body".into(), Value::Array(body));
        Ok(data)
    }
}
