//! NJN document rendering.
//!
//! Turns an untyped, JSON-shaped document tree into rendered markup through
//! a two-phase prepare/render pipeline: blocks are prepared depth-first
//! (resolving their inline and container fields, collecting footnotes and
//! heading state along the way), then each prepared block is rendered
//! through a theme template and the results are stitched into one page.
//!
//! The engine owns none of the markup itself: template lookup and execution
//! ([`ThemeSource`], [`TemplateEngine`]) and shortcode translation
//! ([`ShortcodeTranslator`]) are externally supplied collaborators, which
//! keeps the pipeline deterministic and easy to exercise in tests.
//!
//! ```
//! use std::sync::Arc;
//! use njn::{Engine, StaticTheme, TemplateEngine, TemplateError};
//!
//! struct Echo;
//! impl TemplateEngine for Echo {
//!     fn render(
//!         &self,
//!         _name: &str,
//!         source: &str,
//!         data: &serde_json::Value,
//!     ) -> Result<String, TemplateError> {
//!         let _ = source;
//!         Ok(data["text"].as_str().unwrap_or_default().to_string())
//!     }
//! }
//!
//! let theme = StaticTheme::new().with_template("block/header", "{{text}}");
//! let engine = Engine::new(Arc::new(theme), Arc::new(Echo));
//! let page = engine
//!     .render(r#"[{"type": "header", "content": {"header": "Hello"}}]"#)
//!     .expect("well-formed document");
//! assert_eq!(page.markup, "Hello");
//! ```

pub mod blocks;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod fields;
pub mod heading;
pub mod inline;
pub mod node;
pub mod registry;
pub mod templates;
pub mod toc;
pub mod walker;

pub use config::EngineConfig;
pub use context::{FootnoteRegistry, RenderContext};
pub use engine::{Engine, RenderedDocument};
pub use error::{DecodeError, EngineError, FieldError};
pub use registry::{
    Allowed, BlockHandler, ClassFilter, FieldHandler, HandlerClass, TypeRegistry, default_registry,
};
pub use templates::{
    NoShortcodes, ShortcodeTranslator, StaticTheme, TemplateEngine, TemplateError, TemplateStore,
    ThemeSource,
};
pub use toc::{FlatItem, TocItem};
pub use walker::{PreparedBlock, Walker};
