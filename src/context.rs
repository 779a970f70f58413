//! Per-render mutable state.
//!
//! One [`RenderContext`] is created for each top-level render and discarded
//! afterwards; it is never shared between concurrent renders. Everything the
//! recursive walk needs to keep consistent lives here: block and heading
//! counters, nesting depth, the footnote registry, the per-render template
//! cache, and a reference to the whole document for the TOC block.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use slug::slugify;

use crate::error::FieldError;
use crate::heading::HeadingState;

/// Ordered footnote payloads keyed by the owning block's ordinal.
///
/// Fields append during body preparation; the owning block drains its list
/// while preparing its footer. Ordering is guaranteed purely by that call
/// sequence (body, then footnotes, then footer), so there is no barrier here.
#[derive(Debug, Default)]
pub struct FootnoteRegistry {
    entries: HashMap<u64, Vec<Value>>,
}

impl FootnoteRegistry {
    /// Append a footnote payload for the given block, returning its 0-based
    /// position within that block's list.
    pub fn add(&mut self, block_index: u64, payload: Value) -> usize {
        let list = self.entries.entry(block_index).or_default();
        list.push(payload);
        list.len() - 1
    }

    /// Remove and return the block's footnotes in encounter order.
    pub fn drain(&mut self, block_index: u64) -> Vec<Value> {
        self.entries.remove(&block_index).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mutable state threaded through one document walk.
pub struct RenderContext<'doc> {
    /// Ordinal of the block currently being prepared; bumped once per block.
    pub block_count: u64,
    /// Heading level/count accumulators, shared shape with the TOC walk.
    pub headings: HeadingState,
    /// Footnotes collected during field preparation.
    pub footnotes: FootnoteRegistry,
    /// The entire original document, for handlers that must see past their
    /// own subtree (the TOC block).
    pub document_root: &'doc Value,
    depth: usize,
    max_depth: usize,
    redirect: Option<String>,
    template_cache: HashMap<String, Option<Arc<str>>>,
    anchor_occurrences: HashMap<String, usize>,
}

impl<'doc> RenderContext<'doc> {
    pub fn new(document_root: &'doc Value, max_depth: usize) -> Self {
        Self {
            block_count: 0,
            headings: HeadingState::default(),
            footnotes: FootnoteRegistry::default(),
            document_root,
            depth: 0,
            max_depth,
            redirect: None,
            template_cache: HashMap::new(),
            anchor_occurrences: HashMap::new(),
        }
    }

    /// Record a block's redirect request. Blocks at any nesting depth may
    /// redirect; the first request in document order wins.
    pub fn request_redirect(&mut self, target: String) {
        if self.redirect.is_none() {
            self.redirect = Some(target);
        }
    }

    pub fn take_redirect(&mut self) -> Option<String> {
        self.redirect.take()
    }

    /// Current container nesting depth. Depth above zero suppresses some
    /// top-level styling decorations (content inside an aside, for example).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter one level of container nesting, enforcing the configured limit.
    pub fn enter(&mut self) -> Result<(), FieldError> {
        if self.depth >= self.max_depth {
            return Err(FieldError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Deterministic per-document anchor slugs: repeated heading titles get
    /// monotonic suffixes (`overview`, `overview-2`, ...).
    pub fn anchor_for(&mut self, title: &str) -> String {
        let base = slugify(title);
        let base = if base.is_empty() {
            format!("section-{}", self.block_count)
        } else {
            base
        };
        let count = self.anchor_occurrences.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}-{count}")
        }
    }

    pub(crate) fn cached_template(&self, name: &str) -> Option<Option<Arc<str>>> {
        self.template_cache.get(name).cloned()
    }

    pub(crate) fn cache_template(&mut self, name: &str, source: Option<Arc<str>>) {
        self.template_cache.insert(name.to_string(), source);
    }
}
