use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::escape_html;
use crate::node::{JsonMap, str_key};
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::{payload, require_str};

/// An inline image within running text.
pub struct PictureField;

impl FieldHandler for PictureField {
    fn type_names(&self) -> &'static [&'static str] {
        &["picture"]
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
        let src = require_str(type_name, content, "src")?;

        let mut data = JsonMap::new();
        data.insert("src".into(), Value::String(src.to_string()));
        if let Some(alt) = str_key(content, "alt") {
            data.insert("alt".into(), Value::String(escape_html(alt)));
        }
        Ok(data)
    }
}
