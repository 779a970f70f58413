//! The recursive tree walker and type dispatcher.
//!
//! Resolves a node's type name, finds its handler in the injected registry,
//! and drives the two-phase prepare/render contract. Failures below the
//! document level are recovered in place: a failed block is replaced by a
//! synthetic error block, a failed field by an inline diagnostic, and the
//! rest of the document renders unaffected.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::context::RenderContext;
use crate::error::FieldError;
use crate::inline;
use crate::node::{JsonMap, content_of, plain_text, str_key, type_name_of};
use crate::registry::{ClassFilter, TypeRegistry};
use crate::templates::{ShortcodeTranslator, TemplateEngine, TemplateError, TemplateStore};

/// Output of a block's prepare phase: the resolved type name plus template
/// data. Redirect requests are recorded on the [`RenderContext`] during
/// preparation rather than carried here.
#[derive(Debug, Clone)]
pub struct PreparedBlock {
    pub type_name: String,
    pub data: JsonMap,
}

impl PreparedBlock {
    /// Serialize for embedding inside another block's prepared data (nested
    /// block lists in sidebars, carousels and pairs).
    pub fn to_value(&self) -> Value {
        json!({"type": self.type_name, "data": self.data})
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            type_name: str_key(map, "type")?.to_string(),
            data: map.get("data")?.as_object()?.clone(),
        })
    }
}

/// Stateless dispatch facade borrowed by every recursive call; all mutable
/// state travels in the [`RenderContext`].
pub struct Walker<'e> {
    registry: &'e TypeRegistry,
    store: &'e TemplateStore,
    templates: &'e dyn TemplateEngine,
    shortcodes: &'e dyn ShortcodeTranslator,
    config: &'e EngineConfig,
}

impl<'e> Walker<'e> {
    pub fn new(
        registry: &'e TypeRegistry,
        store: &'e TemplateStore,
        templates: &'e dyn TemplateEngine,
        shortcodes: &'e dyn ShortcodeTranslator,
        config: &'e EngineConfig,
    ) -> Self {
        Self {
            registry,
            store,
            templates,
            shortcodes,
            config,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    pub fn shortcodes(&self) -> &dyn ShortcodeTranslator {
        self.shortcodes
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Prepare one block node. Never fails: type-resolution and payload
    /// errors are wrapped into a synthetic error block in place.
    pub fn prepare_block(&self, ctx: &mut RenderContext<'_>, node: &Value) -> PreparedBlock {
        match self.try_prepare_block(ctx, node) {
            Ok(prepared) => prepared,
            Err(err) => self.error_block(ctx, node, &err),
        }
    }

    fn try_prepare_block(
        &self,
        ctx: &mut RenderContext<'_>,
        node: &Value,
    ) -> Result<PreparedBlock, FieldError> {
        let map = node
            .as_object()
            .ok_or_else(|| FieldError::invalid_value("block", "node", "an object"))?;
        let type_name =
            type_name_of(map).ok_or_else(|| FieldError::missing_key("block", "type"))?;
        let handler = self
            .registry
            .find_block(&type_name)
            .ok_or_else(|| FieldError::unsupported("block", &type_name))?;

        let mut data = self.prepare_generic_block(ctx, &type_name, map);
        let specific = handler.prepare(self, ctx, &type_name, map)?;
        data.extend(specific);

        Ok(PreparedBlock { type_name, data })
    }

    /// The cross-cutting decorations every block receives before its handler
    /// runs: the block ordinal, pass-through styling attributes, the nested
    /// flag, the redirect request, and the first-heading promotion.
    pub fn prepare_generic_block(
        &self,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> JsonMap {
        ctx.block_count += 1;

        let mut data = JsonMap::new();
        data.insert("type".into(), Value::String(type_name.to_string()));
        data.insert("block-index".into(), Value::from(ctx.block_count));

        let nested = ctx.depth() > 0;
        data.insert("nested".into(), Value::Bool(nested));
        for key in ["tag", "theme", "class", "link-href"] {
            if let Some(value) = str_key(node, key) {
                data.insert(key.into(), Value::String(value.to_string()));
            }
        }
        // Outer spacing only applies at the top level; inside an aside or
        // carousel the surrounding block owns the spacing.
        if !nested {
            for key in ["padding", "margins"] {
                if let Some(value) = node.get(key) {
                    data.insert(key.into(), value.clone());
                }
            }
        }

        if let Some(target) = str_key(node, "redirect")
            .map(str::trim)
            .filter(|target| !target.is_empty())
        {
            ctx.request_redirect(target.to_string());
        }

        // First-heading promotion: if nothing has claimed the H1 slot yet
        // and this non-header block renders its own heading, that heading
        // becomes the document's only level-1 heading.
        if type_name != "header" {
            let title = content_of(node)
                .and_then(|content| content.get("header"))
                .map(plain_text)
                .unwrap_or_default();
            if !title.is_empty() {
                if ctx.headings.count == 0 {
                    ctx.headings.level += 1;
                    ctx.headings.count += 1;
                }
                data.insert(
                    "heading-level".into(),
                    Value::from(ctx.headings.level.max(1)),
                );
                let anchor = match str_key(node, "tag") {
                    Some(tag) => tag.to_string(),
                    None => ctx.anchor_for(&title),
                };
                data.insert("anchor".into(), Value::String(anchor));
            }
        }

        data
    }

    /// Render one prepared block through its handler (usually the
    /// conventional `block/<type>` template). Render failures degrade to an
    /// inline diagnostic instead of aborting the document.
    pub fn render_prepared_block(
        &self,
        ctx: &mut RenderContext<'_>,
        prepared: &PreparedBlock,
    ) -> String {
        let Some(handler) = self.registry.find_block(&prepared.type_name) else {
            warn!(
                target: "njn::walker",
                block = %prepared.type_name,
                "prepared block lost its handler between phases"
            );
            return String::new();
        };
        match handler.render(self, ctx, prepared) {
            Ok(markup) => markup,
            Err(err) => {
                warn!(target: "njn::walker", block = %prepared.type_name, error = %err, "block render failed");
                self.render_field_error(ctx, &err)
            }
        }
    }

    /// Execute the `block/<type>` template against prepared data.
    pub fn render_block_template(
        &self,
        ctx: &mut RenderContext<'_>,
        prepared: &PreparedBlock,
    ) -> Result<String, FieldError> {
        let name = format!("block/{}", prepared.type_name);
        self.render_template(ctx, &name, &Value::Object(prepared.data.clone()))
    }

    /// Execute the `field/<type>` template against field data.
    pub fn render_field_template(
        &self,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        mut data: JsonMap,
    ) -> Result<String, FieldError> {
        data.entry("type")
            .or_insert_with(|| Value::String(type_name.to_string()));
        let name = format!("field/{type_name}");
        self.render_template(ctx, &name, &Value::Object(data))
    }

    /// Execute a template by name, resolving source through the per-context
    /// cache backed by the shared store.
    pub fn render_template(
        &self,
        ctx: &mut RenderContext<'_>,
        name: &str,
        data: &Value,
    ) -> Result<String, FieldError> {
        let source = self
            .template_source(ctx, name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })?;
        Ok(self.templates.render(name, &source, data)?)
    }

    pub fn template_source(&self, ctx: &mut RenderContext<'_>, name: &str) -> Option<Arc<str>> {
        if let Some(cached) = ctx.cached_template(name) {
            return cached;
        }
        let source = self.store.source(name);
        ctx.cache_template(name, source.clone());
        source
    }

    /// Render the inline diagnostic for a failed field: the theme's
    /// `field/error` template when it carries one, nothing otherwise.
    pub fn render_field_error(&self, ctx: &mut RenderContext<'_>, err: &FieldError) -> String {
        let data = json!({"type": "error", "message": err.to_string()});
        match self.render_template(ctx, "field/error", &data) {
            Ok(markup) => markup,
            Err(_) => String::new(),
        }
    }

    /// Resolve and render one container field node from a block's sections.
    /// Failures degrade to the inline `field/error` diagnostic.
    pub fn render_container_field(&self, ctx: &mut RenderContext<'_>, node: &Value) -> String {
        match node {
            Value::Array(items) => items
                .iter()
                .map(|item| self.render_container_field(ctx, item))
                .collect(),
            Value::Object(map) => self.render_container_object(ctx, map),
            // Loose scalars in a section list read as bare text.
            other => inline::render_text(self, ctx, other, inline::InlinePolicy::block_text()),
        }
    }

    fn render_container_object(&self, ctx: &mut RenderContext<'_>, map: &JsonMap) -> String {
        let Some(name) = type_name_of(map) else {
            debug!(target: "njn::walker", "section node without a type, dropped");
            return String::new();
        };
        let Some(handler) = self.registry.find_field(ClassFilter::Any, &name) else {
            debug!(target: "njn::walker", field = %name, "unsupported container field type");
            return self.render_field_error(ctx, &FieldError::unsupported("field", &name));
        };

        if let Err(err) = ctx.enter() {
            debug!(target: "njn::walker", field = %name, error = %err, "container recursion limit hit");
            return self.render_field_error(ctx, &err);
        }
        let prepared = handler.prepare_data(self, ctx, &name, map);
        ctx.leave();

        match prepared {
            Ok(data) => match self.render_field_template(ctx, &name, data) {
                Ok(markup) => markup,
                Err(err) => {
                    debug!(target: "njn::walker", field = %name, error = %err, "container field render failed");
                    self.render_field_error(ctx, &err)
                }
            },
            Err(err) => {
                debug!(target: "njn::walker", field = %name, error = %err, "container field rejected");
                self.render_field_error(ctx, &err)
            }
        }
    }

    /// Build the synthetic error block substituted for a failed one: a
    /// collapsible details section carrying the error summary and, when
    /// configured, the offending node's JSON.
    fn error_block(&self, ctx: &mut RenderContext<'_>, node: &Value, err: &FieldError) -> PreparedBlock {
        warn!(target: "njn::walker", error = %err, "block failed to prepare, substituting error block");

        let body = if self.config.error_block_payload {
            let payload = serde_json::to_string_pretty(node).unwrap_or_default();
            json!([{"type": "code", "content": {"text": payload, "language": "json"}}])
        } else {
            json!([])
        };
        let synthetic = json!({
            "type": "content",
            "content": {
                "header": "Unable to render block",
                "sections": [{
                    "type": "details",
                    "content": {"summary": err.to_string(), "body": body}
                }]
            }
        });

        match self.try_prepare_block(ctx, &synthetic) {
            Ok(prepared) => prepared,
            Err(inner) => {
                // A registry without the stock content handler cannot carry
                // the details rendition; fall back to bare data.
                debug!(target: "njn::walker", error = %inner, "error block fell back to bare data");
                let mut data = JsonMap::new();
                data.insert("type".into(), Value::String("content".into()));
                data.insert(
                    "header".into(),
                    Value::String("Unable to render block".into()),
                );
                data.insert("error".into(), Value::String(err.to_string()));
                PreparedBlock {
                    type_name: "content".into(),
                    data,
                }
            }
        }
    }
}
