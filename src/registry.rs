//! The block/field type registry.
//!
//! Maps canonical type names to handler instances, split into inline and
//! container namespaces for fields. The registry is built once by a wiring
//! step ([`default_registry`]) and immutable afterwards; the engine holds it
//! behind an `Arc` and injects it into every walk, so there is no
//! process-global mutable registration.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::context::RenderContext;
use crate::error::FieldError;
use crate::node::JsonMap;
use crate::walker::{PreparedBlock, Walker};

/// Whether a handler's output participates in running text or forms a
/// structural section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerClass {
    Inline,
    Container,
}

impl HandlerClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerClass::Inline => "inline",
            HandlerClass::Container => "container",
        }
    }
}

/// Lookup filter: a concrete class, or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassFilter {
    Inline,
    Container,
    Any,
}

/// Which child tags an inline field admits inside its own text.
#[derive(Debug, Clone, Copy)]
pub enum Allowed {
    /// Any inline-class field. Used for block-level text (headers, footers,
    /// captions), which is not policed.
    Any,
    /// Only the named tags, and only when they resolve to inline handlers.
    Tags(&'static [&'static str]),
}

impl Allowed {
    pub fn permits(&self, tag: &str) -> bool {
        match self {
            Allowed::Any => true,
            Allowed::Tags(tags) => tags.contains(&tag),
        }
    }
}

/// Two-phase contract for one block kind.
pub trait BlockHandler: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn class(&self) -> HandlerClass {
        HandlerClass::Container
    }

    /// Phase one: validate the payload and produce template data. Runs after
    /// the generic decoration step; the result is merged over its output.
    fn prepare(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError>;

    /// Phase two: turn prepared data into markup. The default executes the
    /// conventional `block/<type>` template.
    fn render(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        prepared: &PreparedBlock,
    ) -> Result<String, FieldError> {
        walker.render_block_template(ctx, prepared)
    }
}

/// Single-phase contract for one field kind. A handler may answer to several
/// aliases (the generic tag handler covers every formatting tag).
pub trait FieldHandler: Send + Sync {
    fn type_names(&self) -> &'static [&'static str];

    fn class(&self) -> HandlerClass;

    /// Tags this field admits nested inside its own text. Irrelevant for
    /// fields without text payloads.
    fn allowed_children(&self) -> Allowed {
        Allowed::Tags(&[])
    }

    /// Validate the payload and produce data for the `field/<type>` template.
    fn prepare_data(
        &self,
        walker: &Walker<'_>,
        ctx: &mut RenderContext<'_>,
        type_name: &str,
        node: &JsonMap,
    ) -> Result<JsonMap, FieldError>;
}

/// Immutable-after-wiring handler lookup.
#[derive(Default)]
pub struct TypeRegistry {
    blocks: HashMap<&'static str, Arc<dyn BlockHandler>>,
    inline_fields: HashMap<&'static str, Arc<dyn FieldHandler>>,
    container_fields: HashMap<&'static str, Arc<dyn FieldHandler>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_block(&mut self, handler: Arc<dyn BlockHandler>) {
        self.blocks.insert(handler.type_name(), handler);
    }

    pub fn register_field(&mut self, handler: Arc<dyn FieldHandler>) {
        let namespace = match handler.class() {
            HandlerClass::Inline => &mut self.inline_fields,
            HandlerClass::Container => &mut self.container_fields,
        };
        for name in handler.type_names() {
            namespace.insert(name, Arc::clone(&handler));
        }
    }

    pub fn find_block(&self, name: &str) -> Option<&dyn BlockHandler> {
        self.blocks.get(name).map(Arc::as_ref)
    }

    /// Find a field handler. `Any` matches either namespace, container
    /// first, since it is only used when resolving structural slots.
    pub fn find_field(&self, filter: ClassFilter, name: &str) -> Option<&dyn FieldHandler> {
        fn lookup<'a>(
            map: &'a HashMap<&'static str, Arc<dyn FieldHandler>>,
            name: &str,
        ) -> Option<&'a dyn FieldHandler> {
            map.get(name).map(Arc::as_ref)
        }
        match filter {
            ClassFilter::Inline => lookup(&self.inline_fields, name),
            ClassFilter::Container => lookup(&self.container_fields, name),
            ClassFilter::Any => {
                lookup(&self.container_fields, name).or_else(|| lookup(&self.inline_fields, name))
            }
        }
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<TypeRegistry>> = Lazy::new(|| {
    let mut registry = TypeRegistry::new();
    crate::blocks::register_defaults(&mut registry);
    crate::fields::register_defaults(&mut registry);
    Arc::new(registry)
});

/// The stock registry with every built-in block and field handler wired in.
/// Built on first use and shared by all engines that do not inject their own.
pub fn default_registry() -> Arc<TypeRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}
