use serde_json::Value;
use tracing::debug;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline::{self, InlinePolicy};
use crate::node::JsonMap;
use crate::registry::{FieldHandler, HandlerClass};
use crate::walker::Walker;

use super::payload;

/// A data table: an optional header row plus body rows, every cell inline
/// text. Rows that are not lists are logged and skipped.
pub struct TableField;

impl FieldHandler for TableField {
    fn type_names(&self) -> &'static [&'static str] {
        &["table"]
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
        let rows = content
            .get("rows")
            .and_then(Value::as_array)
            .ok_or_else(|| FieldError::missing_key(type_name, "rows"))?;

        let mut data = JsonMap::new();
        if let Some(headers) = content.get("headers").and_then(Value::as_array) {
            data.insert(
                "headers".into(),
                Value::Array(render_cells(walker, ctx, headers)),
            );
        }

        let body: Vec<Value> = rows
            .iter()
            .filter_map(|row| match row {
                Value::Array(cells) => Some(Value::Array(render_cells(walker, ctx, cells))),
                _ => {
                    debug!(target: "njn::fields", "table row is not a list, skipped");
                    None
                }
            })
            .collect();
        data.insert("rows".into(), Value::Array(body));
        Ok(data)
    }
}

fn render_cells(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    cells: &[Value],
) -> Vec<Value> {
    cells
        .iter()
        .map(|cell| {
            Value::String(inline::render_text(
                walker,
                ctx,
                cell,
                InlinePolicy::block_text(),
            ))
        })
        .collect()
}
