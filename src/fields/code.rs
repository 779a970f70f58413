use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::escape_html;
use crate::node::{JsonMap, str_key};
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// A verbatim code section. Text is escaped only; shortcodes and nested
/// fields never apply inside code.
pub struct CodeField;

impl FieldHandler for CodeField {
    fn type_names(&self) -> &'static [&'static str] {
        &["code", "pre"]
    }

    fn class(&self) -> HandlerClass {
        HandlerClass::Container
    }

    fn prepare_data(
        &self,
        _walker: &Walker<'_>,
        _ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let content = payload(node);
        let text = match content.get("text") {
            Some(Value::String(text)) => text.as_str(),
            Some(_) => {
                return Err(FieldError::invalid_value(type_name, "text", "a string"));
            }
            None => return Err(FieldError::missing_key(type_name, "text")),
        };

        let mut data = JsonMap::new();
        data.insert("text".into(), Value::String(escape_html(text)));
        if let Some(language) = str_key(content, "language") {
            data.insert("language".into(), Value::String(escape_html(language)));
        }
        Ok(data)
    }
}
