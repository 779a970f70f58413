use serde_json::Value;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, content_of, int_key, str_key};
use crate::registry::BlockHandler;
use crate::walker::Walker;

const ALIGNMENTS: &[&str] = &["left", "center", "right"];

/// A named icon with optional alignment and size.
pub struct IconBlock;

impl BlockHandler for IconBlock {
    fn type_name(&self) -> &'static str {
        "icon"
    }

    fn prepare(
        &self,
        _walker: &Walker<'_>,
        _ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError> {
        let content =
            content_of(node).ok_or_else(|| FieldError::missing_key(type_name, "content"))?;
        let icon = str_key(content, "icon")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| FieldError::missing_key(type_name, "icon"))?;

        let alignment = match str_key(content, "alignment") {
            Some(value) if ALIGNMENTS.contains(&value) => value,
            Some(value) => {
                return Err(FieldError::out_of_range(
                    type_name,
                    "alignment",
                    value,
                    "left|center|right",
                ));
            }
            None => "left",
        };

        let mut data = JsonMap::new();
        data.insert("icon".into(), Value::String(icon.to_string()));
        data.insert("alignment".into(), Value::String(alignment.to_string()));
        if let Some(size) = int_key(content, "size") {
            data.insert("size".into(), Value::from(size));
        }
        Ok(data)
    }
}
