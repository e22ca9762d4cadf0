//! Compiled path expressions and the process-wide expression cache.
//!
//! Two spellings compile to the same [`PathExpr`]:
//! - dotted, zero-based: `Loop(1).Info.Supplier`
//! - slash, one-based:   `/Loop[2]/Info/Supplier`

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path expression is empty")]
    Empty,
    #[error("path '{expr}' has an empty segment")]
    EmptySegment { expr: String },
    #[error("path '{expr}' has an invalid segment '{segment}'")]
    InvalidSegment { expr: String, segment: String },
    #[error("path '{expr}' has an invalid index in segment '{segment}'")]
    InvalidIndex { expr: String, segment: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    /// Zero-based position among same-named siblings.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    pub fn compile(expr: &str) -> Result<PathExpr, PathError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = if trimmed.starts_with('/') {
            trimmed
                .trim_start_matches('/')
                .split('/')
                .map(|s| parse_segment(expr, s, '[', ']', 1))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            trimmed
                .split('.')
                .map(|s| parse_segment(expr, s, '(', ')', 0))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(PathExpr { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A new path with `suffix` appended below this one.
    pub fn join(&self, suffix: &PathExpr) -> PathExpr {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        PathExpr { segments }
    }

    /// Render as a descendant XPath, converting indices to one-based predicates.
    pub fn to_xpath(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| {
                if s.index > 0 {
                    format!("{}[{}]", s.name, s.index + 1)
                } else {
                    s.name.clone()
                }
            })
            .collect();
        format!("//{}", parts.join("/"))
    }

    pub fn to_dotted(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| {
                if s.index > 0 {
                    format!("{}({})", s.name, s.index)
                } else {
                    s.name.clone()
                }
            })
            .collect();
        parts.join(".")
    }
}

fn parse_segment(
    expr: &str,
    raw: &str,
    open: char,
    close: char,
    base: usize,
) -> Result<Segment, PathError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PathError::EmptySegment { expr: expr.into() });
    }

    let (name, index) = match raw.find(open) {
        Some(start) => {
            if !raw.ends_with(close) {
                return Err(PathError::InvalidIndex {
                    expr: expr.into(),
                    segment: raw.into(),
                });
            }
            let digits = &raw[start + 1..raw.len() - 1];
            let n: usize = digits.trim().parse().map_err(|_| PathError::InvalidIndex {
                expr: expr.into(),
                segment: raw.into(),
            })?;
            if n < base {
                return Err(PathError::InvalidIndex {
                    expr: expr.into(),
                    segment: raw.into(),
                });
            }
            (&raw[..start], n - base)
        }
        None => (raw, 0),
    };

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ':');
    if !valid {
        return Err(PathError::InvalidSegment {
            expr: expr.into(),
            segment: raw.into(),
        });
    }

    Ok(Segment {
        name: name.to_string(),
        index,
    })
}

// =============================================================================
// CACHE
// =============================================================================

type CacheKey = (String, String);

/// Compiled expressions keyed by `(component type, expression)`.
///
/// Reads share a lock; a miss compiles under the write lock through the map's
/// entry API, so a key is compiled at most once even under concurrent first use.
/// Failed compilations are not stored.
pub struct PathCache {
    entries: RwLock<HashMap<CacheKey, Arc<PathExpr>>>,
    compilations: AtomicUsize,
}

impl PathCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            compilations: AtomicUsize::new(0),
        }
    }

    /// The cache shared by every request in the process.
    pub fn global() -> &'static PathCache {
        static CACHE: OnceLock<PathCache> = OnceLock::new();
        CACHE.get_or_init(PathCache::new)
    }

    pub fn get_or_compile(
        &self,
        component_type: &str,
        expr: &str,
    ) -> Result<Arc<PathExpr>, PathError> {
        let key = (component_type.to_string(), expr.to_string());

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = entries.get(&key) {
                return Ok(Arc::clone(found));
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(key) {
            Entry::Occupied(slot) => Ok(Arc::clone(slot.get())),
            Entry::Vacant(slot) => {
                let compiled = Arc::new(PathExpr::compile(expr)?);
                self.compilations.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(component_type, expr, "compiled path expression");
                Ok(Arc::clone(slot.insert(compiled)))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful compilations performed by this cache.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new()
    }
}
