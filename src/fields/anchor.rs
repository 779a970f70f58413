use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, FORMATTING_TAGS, InlinePolicy, escape_html};
use crate::node::JsonMap;
use crate::registry::{Allowed, FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::{payload, require_str};

/// A hyperlink. Its text admits formatting tags but never another anchor,
/// and never container fields.
pub struct AnchorField;

impl FieldHandler for AnchorField {
    fn type_names(&self) -> &'static [&'static str] {
        &["anchor", "a"]
    }

    fn class(&self) -> HandlerClass {
        HandlerClass::Inline
    }

    fn allowed_children(&self) -> Allowed {
        Allowed::Tags(FORMATTING_TAGS)
    }

    fn prepare_data(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let content = payload(node);
        let href = require_str(type_name, content, "href")?;

        let text = match content.get("text") {
            Some(text) => inline::render_text(
                walker,
                ctx,
                text,
                InlinePolicy::tags("anchor", FORMATTING_TAGS),
            ),
            None => escape_html(href),
        };

        let mut data = JsonMap::new();
        data.insert("href".into(), Value::String(href.to_string()));
        data.insert("text".into(), Value::String(text));
        Ok(data)
    }
}
