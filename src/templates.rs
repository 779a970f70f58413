//! Template collaborators.
//!
//! The engine never executes templates itself: it resolves raw template
//! source by convention name (`block/<type>`, `field/<type>`, `block-list`)
//! through a [`ThemeSource`] chain and hands source plus prepared data to an
//! externally supplied [`TemplateEngine`]. Source lookups are cached twice:
//! per render context, and in a process-wide [`TemplateStore`] shared by
//! concurrent renders behind a reader/writer lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{name}` not found in theme chain")]
    NotFound { name: String },
    #[error("template `{name}` failed to render: {message}")]
    Render { name: String, message: String },
}

impl TemplateError {
    pub fn render(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Supplies raw template source by name, with an optional parent theme that
/// is consulted when this theme lacks the name.
pub trait ThemeSource: Send + Sync {
    fn template_source(&self, name: &str) -> Option<String>;

    fn parent(&self) -> Option<&dyn ThemeSource> {
        None
    }
}

/// Executes a template source against prepared data, producing markup.
/// Implementations must be deterministic: the same name, source and data
/// always yield the same markup or the same error.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, name: &str, source: &str, data: &Value) -> Result<String, TemplateError>;
}

/// Translates shortcodes embedded in raw text fragments before they are
/// treated as final markup. The default implementation passes text through
/// untouched.
pub trait ShortcodeTranslator: Send + Sync {
    fn translate(&self, raw: &str) -> String;
}

/// No-op shortcode translator for hosts without a shortcode dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShortcodes;

impl ShortcodeTranslator for NoShortcodes {
    fn translate(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// An in-memory theme, mostly useful for tests and embedded defaults.
#[derive(Default)]
pub struct StaticTheme {
    templates: HashMap<String, String>,
    parent: Option<Box<dyn ThemeSource>>,
}

impl StaticTheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(name.into(), source.into());
        self
    }

    pub fn with_parent(mut self, parent: impl ThemeSource + 'static) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl ThemeSource for StaticTheme {
    fn template_source(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }

    fn parent(&self) -> Option<&dyn ThemeSource> {
        self.parent.as_deref()
    }
}

/// Shared, cross-render cache of template source keyed by convention name.
///
/// Reads vastly outnumber writes: a writer takes the lock only for the single
/// insert on first load of a given name. Misses are cached as `None` so a
/// theme chain is never re-walked for a template it does not carry.
pub struct TemplateStore {
    theme: Arc<dyn ThemeSource>,
    cache: RwLock<HashMap<String, Option<Arc<str>>>>,
}

impl TemplateStore {
    pub fn new(theme: Arc<dyn ThemeSource>) -> Self {
        Self {
            theme,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve template source, consulting parent themes on a miss.
    pub fn source(&self, name: &str) -> Option<Arc<str>> {
        if let Some(cached) = self.cache.read().unwrap().get(name) {
            return cached.clone();
        }

        let resolved = resolve_in_chain(self.theme.as_ref(), name).map(Arc::from);
        if resolved.is_none() {
            trace!(target: "njn::templates", name, "template missing from theme chain");
        }
        self.cache
            .write()
            .unwrap()
            .insert(name.to_string(), resolved.clone());
        resolved
    }

    /// Drop all cached entries, e.g. after a theme reload.
    pub fn invalidate(&self) {
        self.cache.write().unwrap().clear();
    }

    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.cache.read().unwrap().len()
    }
}

fn resolve_in_chain(theme: &dyn ThemeSource, name: &str) -> Option<String> {
    if let Some(source) = theme.template_source(name) {
        return Some(source);
    }
    theme.parent().and_then(|parent| resolve_in_chain(parent, name))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingTheme {
        lookups: AtomicUsize,
        inner: StaticTheme,
    }

    impl ThemeSource for CountingTheme {
        fn template_source(&self, name: &str) -> Option<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.template_source(name)
        }
    }

    #[test]
    fn falls_back_to_parent_theme() {
        let parent = StaticTheme::new().with_template("block/content", "parent source");
        let child = StaticTheme::new()
            .with_template("block/header", "child source")
            .with_parent(parent);
        let store = TemplateStore::new(Arc::new(child));

        assert_eq!(store.source("block/header").as_deref(), Some("child source"));
        assert_eq!(
            store.source("block/content").as_deref(),
            Some("parent source")
        );
        assert!(store.source("block/missing").is_none());
    }

    #[test]
    fn caches_hits_and_misses() {
        let theme = Arc::new(CountingTheme {
            lookups: AtomicUsize::new(0),
            inner: StaticTheme::new().with_template("block-list", "list"),
        });
        let store = TemplateStore::new(theme.clone());

        store.source("block-list");
        store.source("block-list");
        store.source("block/absent");
        store.source("block/absent");

        assert_eq!(store.cached_len(), 2);
        assert_eq!(theme.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_clears_cache() {
        let store = TemplateStore::new(Arc::new(
            StaticTheme::new().with_template("block-list", "list"),
        ));
        store.source("block-list");
        assert_eq!(store.cached_len(), 1);
        store.invalidate();
        assert_eq!(store.cached_len(), 0);
    }
}
