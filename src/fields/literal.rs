use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::JsonMap;
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

/// Void elements with no payload at all: line breaks and rules.
pub struct LiteralField;

impl FieldHandler for LiteralField {
    fn type_names(&self) -> &'static [&'static str] {
        &["br", "hr"]
    }

    fn class(&self) -> HandlerClass {
        HandlerClass::Inline
    }

    fn prepare_data(
        &self,
        _walker: &Walker<'_>,
        _ctx: &mut RenderContext<'_>,
        type_name: &str,
        _node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let mut data = JsonMap::new();
        data.insert("tag".into(), Value::String(type_name.to_string()));
        Ok(data)
    }
}
