use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::escape_html;
use crate::node::{JsonMap, plain_text, str_key};
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// Build one option's data from its payload: the display text plus a value
/// defaulting to the text itself. Shared with the select handler, which
/// accepts bare option payloads without the field wrapper.
pub(crate) fn option_data(type_name: &str, content: &JsonMap) -> Result<JsonMap, FieldError> {
    let text = content
        .get("text")
        .map(plain_text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| FieldError::missing_key(type_name, "text"))?;
    let value = str_key(content, "value").unwrap_or(&text).to_string();

    let mut data = JsonMap::new();
    data.insert("value".into(), Value::String(escape_html(&value)));
    data.insert("text".into(), Value::String(escape_html(&text)));
    Ok(data)
}

/// A single choice, meaningful inside a `select`.
pub struct OptionField;

impl FieldHandler for OptionField {
    fn type_names(&self) -> &'static [&'static str] {
        &["option"]
    }

    fn class(&self) -> HandlerClass {
        HandlerClass::Inline
    }

    fn prepare_data(
        &self,
        _walker: &Walker<'_>,
        _ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        option_data(type_name, payload(node))
    }
}
