//! The rendering engine facade.
//!
//! One [`Engine`] is built per theme and shared across threads; each call to
//! [`Engine::render`] runs the full two-phase pipeline against a fresh
//! [`RenderContext`], so concurrent renders never observe each other's
//! counters, footnotes or per-render template cache. The only shared state
//! is the reader/writer-locked template store.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::context::RenderContext;
use crate::error::EngineError;
use crate::node::decode_document;
use crate::registry::{TypeRegistry, default_registry};
use crate::templates::{
    NoShortcodes, ShortcodeTranslator, TemplateEngine, TemplateStore, ThemeSource,
};
use crate::walker::{PreparedBlock, Walker};

/// Result of rendering one document: the markup, or a redirect target the
/// caller should serve instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub markup: String,
    pub redirect: Option<String>,
}

/// The document-rendering engine. Construction wires the collaborator set;
/// rendering is synchronous, single-threaded per call, and deterministic.
pub struct Engine {
    registry: Arc<TypeRegistry>,
    store: TemplateStore,
    templates: Arc<dyn TemplateEngine>,
    shortcodes: Arc<dyn ShortcodeTranslator>,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over a theme and template executor, with the stock
    /// handler registry, no shortcode dialect, and default limits.
    pub fn new(theme: Arc<dyn ThemeSource>, templates: Arc<dyn TemplateEngine>) -> Self {
        Self {
            registry: default_registry(),
            store: TemplateStore::new(theme),
            templates,
            shortcodes: Arc::new(NoShortcodes),
            config: EngineConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_shortcodes(mut self, shortcodes: Arc<dyn ShortcodeTranslator>) -> Self {
        self.shortcodes = shortcodes;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Render a raw JSON document. Only a decode failure is fatal; every
    /// in-document failure degrades to an inline diagnostic.
    pub fn render(&self, raw: &str) -> Result<RenderedDocument, EngineError> {
        let document = decode_document(raw)?;
        Ok(self.render_value(&document))
    }

    /// Render an already-decoded document tree.
    pub fn render_value(&self, document: &Value) -> RenderedDocument {
        let mut ctx = RenderContext::new(document, self.config.max_depth);
        let walker = Walker::new(
            self.registry.as_ref(),
            &self.store,
            self.templates.as_ref(),
            self.shortcodes.as_ref(),
            &self.config,
        );

        let prepared = prepare_page_data(&walker, &mut ctx, document);

        if let Some(redirect) = ctx.take_redirect() {
            debug!(target: "njn::engine", redirect = %redirect, "document requested redirect");
            return RenderedDocument {
                markup: String::new(),
                redirect: Some(redirect),
            };
        }

        let markup = render_block_list(&walker, &mut ctx, &prepared);
        RenderedDocument {
            markup,
            redirect: None,
        }
    }

    /// Drop cached template sources, e.g. after the theme changed on disk.
    pub fn invalidate_templates(&self) {
        self.store.invalidate();
    }
}

/// Recursively flatten the document's block lists, preparing each block map
/// in document order.
fn prepare_page_data(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    node: &Value,
) -> Vec<PreparedBlock> {
    let mut prepared = Vec::new();
    flatten_blocks(walker, ctx, node, &mut prepared);
    prepared
}

fn flatten_blocks(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    node: &Value,
    out: &mut Vec<PreparedBlock>,
) {
    match node {
        Value::Array(items) => {
            for item in items {
                flatten_blocks(walker, ctx, item, out);
            }
        }
        Value::Object(map) if map.contains_key("type") => {
            out.push(walker.prepare_block(ctx, node));
        }
        Value::Object(map) => {
            if let Some(blocks) = map.get("blocks") {
                flatten_blocks(walker, ctx, blocks, out);
            } else {
                trace!(target: "njn::engine", "object without type or blocks at page level, skipped");
            }
        }
        Value::Null => {}
        _ => {
            trace!(target: "njn::engine", "scalar at page level, skipped");
        }
    }
}

/// Render each prepared block and hand the list to the `block-list`
/// template, falling back to plain concatenation when the theme lacks one.
fn render_block_list(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    prepared: &[PreparedBlock],
) -> String {
    let markups: Vec<String> = prepared
        .iter()
        .map(|block| walker.render_prepared_block(ctx, block))
        .collect();

    let data = json!({ "blocks": markups });
    match walker.render_template(ctx, "block-list", &data) {
        Ok(markup) => markup,
        Err(_) => markups.join("\n"),
    }
}
