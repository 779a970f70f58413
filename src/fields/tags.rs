use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy, TEXT_TAGS};
use crate::node::JsonMap;
use crate::registry::{Allowed, FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// One handler for every plain formatting tag. The alias the document used
/// is carried through as `tag` so a single `field/<tag>` template lookup
/// still resolves per tag name.
pub struct TagField;

impl FieldHandler for TagField {
    fn type_names(&self) -> &'static [&'static str] {
        &[
            "em", "strong", "b", "i", "s", "u", "sub", "sup", "small", "mark", "q", "kbd", "samp",
            "var", "cite", "del", "ins",
        ]
    }

    fn class(&self) -> HandlerClass {
        HandlerClass::Inline
    }

    fn allowed_children(&self) -> Allowed {
        Allowed::Tags(TEXT_TAGS)
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
        data.insert("tag".into(), Value::String(type_name.to_string()));
        data.insert(
            "text".into(),
            Value::String(inline::render_text(
                walker,
                ctx,
                text,
                InlinePolicy::tags("tag", TEXT_TAGS),
            )),
        );
        Ok(data)
    }
}
