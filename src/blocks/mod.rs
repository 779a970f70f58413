//! Built-in block handlers.
//!
//! One module per block kind, each implementing the two-phase
//! [`BlockHandler`](crate::registry::BlockHandler) contract. Blocks share the
//! helpers here for inline text payloads, section lists and nested block
//! lists (sidebars, carousels, pairs).

mod carousel;
mod content;
mod header;
mod icon;
mod image;
mod link_list;
mod notice;
mod pair;
mod sidebar;
mod toc;

use std::sync::Arc;

use serde_json::{Value, json};

use crate::context::RenderContext;
use crate::inline::{self, InlinePolicy};
use crate::node::JsonMap;
use crate::registry::TypeRegistry;
use crate::walker::{PreparedBlock, Walker};

/// Wire every built-in block handler into the registry.
pub fn register_defaults(registry: &mut TypeRegistry) {
    registry.register_block(Arc::new(content::ContentBlock));
    registry.register_block(Arc::new(header::HeaderBlock));
    registry.register_block(Arc::new(icon::IconBlock));
    registry.register_block(Arc::new(image::ImageBlock));
    registry.register_block(Arc::new(link_list::LinkListBlock));
    registry.register_block(Arc::new(notice::NoticeBlock));
    registry.register_block(Arc::new(toc::TocBlock));
    registry.register_block(Arc::new(sidebar::SidebarBlock));
    registry.register_block(Arc::new(carousel::CarouselBlock));
    registry.register_block(Arc::new(pair::PairBlock));
}

/// Render a block-level inline text payload (header, footer, caption).
pub(crate) fn inline_text(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    content: &JsonMap,
    key: &str,
) -> Option<String> {
    content
        .get(key)
        .map(|value| inline::render_text(walker, ctx, value, InlinePolicy::block_text()))
}

/// Render a block's `sections` list to per-section markup.
pub(crate) fn section_markup(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    content: &JsonMap,
) -> Vec<Value> {
    content
        .get("sections")
        .and_then(Value::as_array)
        .map(|sections| {
            sections
                .iter()
                .map(|section| Value::String(walker.render_container_field(ctx, section)))
                .collect()
        })
        .unwrap_or_default()
}

/// Drain and number the block's collected footnotes for template data.
/// Must run after every footnote-bearing section of the block has been
/// prepared; `None` when the block registered no footnotes.
pub(crate) fn drained_footnotes(ctx: &mut RenderContext<'_>, block_index: u64) -> Option<Value> {
    let notes = ctx.footnotes.drain(block_index);
    if notes.is_empty() {
        return None;
    }
    let numbered: Vec<Value> = notes
        .into_iter()
        .enumerate()
        .map(|(idx, note)| {
            json!({
                "number": idx + 1,
                "text": note.get("text").cloned().unwrap_or(Value::Null),
                "anchor": format!("fn-{block_index}-{}", idx + 1),
            })
        })
        .collect();
    Some(Value::Array(numbered))
}

/// Prepare a nested block list depth-first, in document order, so counters
/// and footnotes observe nested blocks exactly where they sit. A nested
/// block's redirect request lands on the context like any other.
pub(crate) fn prepare_block_list(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    blocks: &[Value],
) -> Vec<Value> {
    blocks
        .iter()
        .map(|block| walker.prepare_block(ctx, block).to_value())
        .collect()
}

/// Render a list of embedded prepared blocks back to markup.
pub(crate) fn render_prepared_list(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    value: Option<&Value>,
) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(PreparedBlock::from_value)
                .map(|prepared| Value::String(walker.render_prepared_block(ctx, &prepared)))
                .collect()
        })
        .unwrap_or_default()
}
