//! Table-of-contents assembly.
//!
//! Two passes over the whole document: a depth-first flatten that records
//! every heading observation (re-running the shared heading-directive
//! evaluator so TOC levels match rendered levels), then a single-parent nest
//! that groups the flat sequence into an outline.
//!
//! The nest pass deliberately tracks only one parent and one level at a
//! time: an item deeper than the tracked level attaches to the current
//! parent and becomes the new parent itself, an item at or above it starts a
//! new top-level entry. Jumps of more than one level therefore flatten into
//! the nearest parent instead of forming a full multi-level tree. That is
//! the engine's documented behaviour and callers depend on it; resist the
//! urge to generalise it.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use slug::slugify;

use crate::heading::HeadingState;
use crate::node::{JsonMap, content_of, plain_text, str_key, type_name_of};

/// One heading observation from the flatten pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatItem {
    /// Anchor target, from the node's explicit `tag` or a slug of its title.
    pub tag: String,
    pub title: String,
    pub level: i64,
}

/// One outline entry after nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    pub tag: String,
    pub title: String,
    pub level: i64,
    pub children: Vec<TocItem>,
}

struct WalkState {
    headings: HeadingState,
    anchor_occurrences: HashMap<String, usize>,
}

/// Flatten every heading observation in document order.
pub fn collect(document: &Value) -> Vec<FlatItem> {
    let mut state = WalkState {
        headings: HeadingState::default(),
        anchor_occurrences: HashMap::new(),
    };
    let mut out = Vec::new();
    walk(&mut state, document, &mut out);
    out
}

fn walk(state: &mut WalkState, node: &Value, out: &mut Vec<FlatItem>) {
    match node {
        Value::Array(items) => {
            for item in items {
                walk(state, item, out);
            }
        }
        Value::Object(map) => walk_object(state, map, out),
        _ => {}
    }
}

fn walk_object(state: &mut WalkState, map: &JsonMap, out: &mut Vec<FlatItem>) {
    let name = type_name_of(map);
    let content = content_of(map);
    let title = content
        .and_then(|content| content.get("header"))
        .map(plain_text)
        .unwrap_or_default();

    match name.as_deref() {
        // Transparent wrappers: no entry of their own, children walked. The
        // bookkeeping still runs so counters and slugs stay aligned with the
        // render path when a wrapper happens to carry a title.
        Some("carousel") | Some("pair") => {
            titled_observation(state, map, &title);
            if let Some(content) = content {
                for child in content.values() {
                    walk(state, child, out);
                }
            }
        }
        // The TOC block's own heading is handled by its include-self option;
        // emitting it here as well would duplicate the entry.
        Some("toc") => {
            titled_observation(state, map, &title);
        }
        Some("header") => {
            static EMPTY: once_cell::sync::Lazy<JsonMap> = once_cell::sync::Lazy::new(JsonMap::new);
            let eval = state.headings.advance(content.unwrap_or(&EMPTY));
            // Slugs are consumed for every header so anchors stay aligned
            // with the render path even though H1 entries are suppressed.
            let tag = anchor(state, map, &title);
            if eval.level > 1 && !title.is_empty() {
                out.push(FlatItem {
                    tag,
                    title,
                    level: eval.level,
                });
            }
        }
        Some("sidebar") => {
            if let Some(item) = titled_observation(state, map, &title) {
                out.push(item);
            }
            // Sidebars do not start a new numbering scope: nested blocks
            // share the same accumulators.
            if let Some(blocks) = content.and_then(|content| content.get("blocks")) {
                walk(state, blocks, out);
            }
        }
        _ => {
            if let Some(item) = titled_observation(state, map, &title) {
                out.push(item);
            }
            if let Some(content) = content {
                for child in content.values() {
                    walk(state, child, out);
                }
            }
        }
    }
}

/// Mirror of the generic prepare step for titled non-header blocks: the
/// first titled thing in the document claims the H1 slot (and, like H1
/// headers, stays out of the outline), later ones land at the running level.
/// Anchor slugs are consumed either way.
fn titled_observation(state: &mut WalkState, map: &JsonMap, title: &str) -> Option<FlatItem> {
    if title.is_empty() {
        return None;
    }
    let promoted = state.headings.count == 0;
    if promoted {
        state.headings.level += 1;
        state.headings.count += 1;
    }
    let tag = anchor(state, map, title);
    if promoted {
        return None;
    }
    Some(FlatItem {
        tag,
        title: title.to_string(),
        level: state.headings.level.max(1),
    })
}

fn anchor(state: &mut WalkState, map: &JsonMap, title: &str) -> String {
    if let Some(tag) = str_key(map, "tag") {
        return tag.to_string();
    }
    let base = slugify(title);
    if base.is_empty() {
        return String::new();
    }
    let count = state.anchor_occurrences.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        format!("{base}-{count}")
    }
}

/// Nest a flat heading sequence with the single-parent algorithm.
pub fn nest(flat: Vec<FlatItem>) -> Vec<TocItem> {
    let mut out: Vec<TocItem> = Vec::new();
    let mut path: Vec<usize> = Vec::new();
    let mut tracked: i64 = 1;

    for item in flat {
        let entry = TocItem {
            tag: item.tag,
            title: item.title,
            level: item.level,
            children: Vec::new(),
        };
        if item.level <= tracked || path.is_empty() {
            out.push(entry);
            path.clear();
            path.push(out.len() - 1);
        } else {
            let parent = follow(&mut out, &path);
            parent.children.push(entry);
            let next = parent.children.len() - 1;
            path.push(next);
        }
        tracked = item.level;
    }

    out
}

fn follow<'a>(out: &'a mut [TocItem], path: &[usize]) -> &'a mut TocItem {
    let (first, rest) = path.split_first().expect("path is never empty here");
    let mut current = &mut out[*first];
    for idx in rest {
        current = &mut current.children[*idx];
    }
    current
}
