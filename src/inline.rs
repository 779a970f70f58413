//! Inline text assembly.
//!
//! Block headers, footers and inline field payloads carry "text": a string,
//! or a list interleaving strings with nested inline field objects. String
//! fragments are HTML-escaped and passed through the shortcode translator;
//! field objects are dispatched through the registry under the parent's
//! allow-list. A child denied by the policy is dropped with a trace, never
//! surfaced as a document error.

use serde_json::Value;
use tracing::{debug, trace};

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::{JsonMap, type_name_of};
use crate::registry::{Allowed, ClassFilter};
use crate::walker::Walker;

/// Formatting tags that are safe inside any text-bearing inline field.
pub const FORMATTING_TAGS: &[&str] = &[
    "em", "strong", "b", "i", "s", "u", "sub", "sup", "small", "mark", "q", "kbd", "samp", "var",
    "cite", "del", "ins", "br",
];

/// Formatting tags plus links, the usual policy for top-level tag text.
pub const TEXT_TAGS: &[&str] = &[
    "em", "strong", "b", "i", "s", "u", "sub", "sup", "small", "mark", "q", "kbd", "samp", "var",
    "cite", "del", "ins", "br", "anchor", "a",
];

/// The nesting policy an inline parent imposes on its children.
#[derive(Debug, Clone, Copy)]
pub struct InlinePolicy {
    /// Name of the imposing parent, for trace diagnostics.
    pub parent: &'static str,
    pub allowed: Allowed,
}

impl InlinePolicy {
    /// Unpoliced block-level text (headers, footers, captions).
    pub const fn block_text() -> Self {
        Self {
            parent: "block",
            allowed: Allowed::Any,
        }
    }

    pub const fn tags(parent: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            parent,
            allowed: Allowed::Tags(allowed),
        }
    }
}

/// Render an inline-text payload to markup.
pub fn render_text(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    value: &Value,
    policy: InlinePolicy,
) -> String {
    match value {
        Value::String(text) => walker.shortcodes().translate(&escape_html(text)),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| render_text(walker, ctx, item, policy))
            .collect(),
        Value::Object(map) => render_inline_field(walker, ctx, map, policy),
        Value::Null => String::new(),
    }
}

/// Dispatch one inline field object under the parent's policy.
fn render_inline_field(
    walker: &Walker<'_>,
    ctx: &mut RenderContext<'_>,
    node: &JsonMap,
    policy: InlinePolicy,
) -> String {
    let Some(name) = type_name_of(node) else {
        debug!(target: "njn::inline", parent = policy.parent, "inline node without a type, dropped");
        return String::new();
    };

    let registry = walker.registry();
    let Some(handler) = registry.find_field(ClassFilter::Inline, &name) else {
        if registry.find_field(ClassFilter::Container, &name).is_some() {
            // Container field in running text: a nesting-policy violation,
            // dropped without a document-visible diagnostic.
            trace!(
                target: "njn::inline",
                parent = policy.parent,
                child = %name,
                "container field denied in inline text"
            );
            return String::new();
        }
        debug!(target: "njn::inline", parent = policy.parent, child = %name, "unsupported inline field type");
        return walker.render_field_error(ctx, &FieldError::unsupported("inline field", &name));
    };

    if !policy.allowed.permits(&name) {
        trace!(
            target: "njn::inline",
            parent = policy.parent,
            child = %name,
            "inline child denied by parent allow-list"
        );
        return String::new();
    }

    match handler.prepare_data(walker, ctx, &name, node) {
        Ok(data) => match walker.render_field_template(ctx, &name, data) {
            Ok(markup) => markup,
            Err(err) => {
                debug!(target: "njn::inline", field = %name, error = %err, "inline field render failed");
                walker.render_field_error(ctx, &err)
            }
        },
        Err(err) => {
            debug!(target: "njn::inline", field = %name, error = %err, "inline field rejected");
            walker.render_field_error(ctx, &err)
        }
    }
}

/// Minimal HTML escaping for text fragments destined for markup.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
