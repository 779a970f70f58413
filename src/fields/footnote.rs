use serde_json::{Value, json};

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy, TEXT_TAGS};
use crate::node::JsonMap;
use crate::registry::{Allowed, FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// A footnote reference. Registers its rendered text on the context under
/// the current block's ordinal and renders as a numbered marker; the owning
/// block drains the registry when it prepares its footer, which is why body
/// fields must be prepared strictly before that drain.
pub struct FootnoteField;

impl FieldHandler for FootnoteField {
    fn type_names(&self) -> &'static [&'static str] {
        &["footnote"]
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
        let text = inline::render_text(walker, ctx, text, InlinePolicy::tags("footnote", TEXT_TAGS));

        let block_index = ctx.block_count;
        let index = ctx.footnotes.add(block_index, json!({"text": text}));
        let number = index + 1;

        let mut data = JsonMap::new();
        data.insert("number".into(), Value::from(number));
        data.insert("block".into(), Value::from(block_index));
        data.insert(
            "anchor".into(),
            Value::String(format!("fn-{block_index}-{number}")),
        );
        Ok(data)
    }
}
