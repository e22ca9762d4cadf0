//! Bean store access: per-component header values and body documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One instantiated occurrence of a service component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBean {
    /// Header values keyed by dotted field path.
    #[serde(default)]
    pub header: BTreeMap<String, String>,
    /// Body document as XML text.
    #[serde(default)]
    pub body: Option<String>,
}

impl ComponentBean {
    pub fn with_header<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            header: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            body: None,
        }
    }

    /// Header value at `path`; empty strings count as absent.
    pub fn header_value(&self, path: &str) -> Option<&str> {
        self.header
            .get(path)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Read access to the beans of an in-progress bundle order.
pub trait BundleBag {
    /// Number of instantiated occurrences of a component.
    fn bean_count(&self, component_id: &str) -> usize;

    /// The `index`-th occurrence (zero-based) of a component.
    fn bean(&self, component_id: &str, index: usize) -> Option<&ComponentBean>;
}

/// In-memory bag, keyed by component id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryBundleBag {
    components: BTreeMap<String, Vec<ComponentBean>>,
}

impl MemoryBundleBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an occurrence of `component_id`.
    pub fn add(&mut self, component_id: impl Into<String>, bean: ComponentBean) -> &mut Self {
        self.components
            .entry(component_id.into())
            .or_default()
            .push(bean);
        self
    }
}

impl BundleBag for MemoryBundleBag {
    fn bean_count(&self, component_id: &str) -> usize {
        self.components.get(component_id).map_or(0, |beans| beans.len())
    }

    fn bean(&self, component_id: &str, index: usize) -> Option<&ComponentBean> {
        self.components.get(component_id)?.get(index)
    }
}
