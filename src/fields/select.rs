use serde_json::Value;
use tracing::debug;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::escape_html;
use crate::node::{JsonMap, content_of, str_key};
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::{option_data, payload};

/// A choice control. Options are `option` field nodes or bare
/// `{value, text}` objects; malformed entries are logged and skipped.
pub struct SelectField;

impl FieldHandler for SelectField {
    fn type_names(&self) -> &'static [&'static str] {
        &["select"]
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
        let content = payload(node);
        let options = content
            .get("options")
            .and_then(Value::as_array)
            .ok_or_else(|| FieldError::missing_key(type_name, "options"))?;

        let mut items = Vec::with_capacity(options.len());
        for option in options {
            let Some(map) = option.as_object() else {
                debug!(target: "njn::fields", "select option is not an object, skipped");
                continue;
            };
            let inner = content_of(map).unwrap_or(map);
            match option_data("option", inner) {
                Ok(data) => items.push(Value::Object(data)),
                Err(err) => {
                    debug!(target: "njn::fields", error = %err, "select option rejected, skipped");
                }
            }
        }

        let mut data = JsonMap::new();
        if let Some(legend) = str_key(content, "legend") {
            data.insert("legend".into(), Value::String(escape_html(legend)));
        }
        data.insert("options".into(), Value::Array(items));
        Ok(data)
    }
}
