//! Existing-Data Resolver: current values of additional-info fields.
//!
//! Lookup order for `(component, path)`:
//! 1. header of the component's first bean, when the component has at least one bean;
//! 2. the predefined-bundle default document;
//! 3. absent.
//!
//! Read misses and read errors are both reported as absent.

pub mod bag;
pub mod path;

use crate::parse::predefined::{COUNT, PredefinedBundles, SERVICE_COMPONENTS};

pub use bag::{BundleBag, ComponentBean, MemoryBundleBag};
pub use path::{PathCache, PathExpr};

/// The predefined document together with the bundle selected in it.
#[derive(Debug, Clone, Copy)]
pub struct PredefinedScope<'a> {
    pub doc: &'a PredefinedBundles,
    pub bundle_name: &'a str,
}

pub struct ExistingDataResolver<'a> {
    bag: &'a dyn BundleBag,
    predefined: Option<PredefinedScope<'a>>,
    cache: &'a PathCache,
}

impl<'a> ExistingDataResolver<'a> {
    pub fn new(bag: &'a dyn BundleBag) -> Self {
        Self {
            bag,
            predefined: None,
            cache: PathCache::global(),
        }
    }

    pub fn with_predefined(mut self, doc: &'a PredefinedBundles, bundle_name: &'a str) -> Self {
        self.predefined = Some(PredefinedScope { doc, bundle_name });
        self
    }

    pub fn with_cache(mut self, cache: &'a PathCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn bag(&self) -> &'a dyn BundleBag {
        self.bag
    }

    /// Current value of `field_path` for `component_id`, if any.
    pub fn resolve(&self, component_id: &str, field_path: &str) -> Option<String> {
        if self.bag.bean_count(component_id) > 0 {
            return self
                .bag
                .bean(component_id, 0)
                .and_then(|bean| bean.header_value(field_path))
                .map(str::to_string);
        }
        self.predefined_value(component_id, field_path)
    }

    /// Number of occurrences of `component_id`: live beans first, then the predefined count.
    pub fn occurrence_count(&self, component_id: &str) -> usize {
        let live = self.bag.bean_count(component_id);
        if live > 0 {
            return live;
        }
        match self.predefined_value(component_id, COUNT) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(component_id, count = %raw, "unparseable predefined count, using 0");
                0
            }),
            None => 0,
        }
    }

    /// Occurrence count taken from live beans only.
    pub fn live_count(&self, component_id: &str) -> usize {
        self.bag.bean_count(component_id)
    }

    /// Every non-empty header value of the component's first bean.
    pub fn header_fields(&self, component_id: &str) -> Vec<(String, String)> {
        self.bag
            .bean(component_id, 0)
            .map(|bean| {
                bean.header
                    .iter()
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn predefined_value(&self, component_id: &str, relative: &str) -> Option<String> {
        let scope = self.predefined?;
        let expr = format!(
            "{}.{}.{}.{}",
            scope.bundle_name, SERVICE_COMPONENTS, component_id, relative
        );
        match self.cache.get_or_compile(component_id, &expr) {
            Ok(path) => scope.doc.value(&path).map(str::to_string),
            Err(e) => {
                tracing::debug!(component_id, error = %e, "predefined lookup treated as absent");
                None
            }
        }
    }
}
