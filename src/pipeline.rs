//! Full collection pipeline: validate → resolve → reconcile → check → filter → assemble.
//!
//! Every failure surfaces as a single descriptive `CollectError`.

use serde::Deserialize;

use crate::assemble;
use crate::config::CollectOptions;
use crate::error::CollectError;
use crate::filter::{MemoryDirectory, OptionFilter, TradingPartnerDirectory};
use crate::ir::types::Artifacts;
use crate::ir::validate::validate_reconciliation;
use crate::parse::graph::DeclarationGraph;
use crate::parse::predefined::PredefinedBundles;
use crate::parse::types::ServiceCatalog;
use crate::reconcile::Reconciler;
use crate::resolve::{BundleBag, ExistingDataResolver, MemoryBundleBag, PathCache};
use crate::validate::validate_catalog;

/// Collaborators a collection run reads from.
pub struct CollectContext<'a> {
    pub bag: &'a dyn BundleBag,
    pub directory: &'a dyn TradingPartnerDirectory,
    pub predefined: Option<&'a PredefinedBundles>,
    pub cache: &'a PathCache,
}

impl<'a> CollectContext<'a> {
    pub fn new(bag: &'a dyn BundleBag, directory: &'a dyn TradingPartnerDirectory) -> Self {
        Self {
            bag,
            directory,
            predefined: None,
            cache: PathCache::global(),
        }
    }

    pub fn with_predefined(mut self, doc: &'a PredefinedBundles) -> Self {
        self.predefined = Some(doc);
        self
    }

    pub fn with_cache(mut self, cache: &'a PathCache) -> Self {
        self.cache = cache;
        self
    }
}

/// Run every phase for one bundle.
pub fn collect(
    catalog: &ServiceCatalog,
    bundle_id: &str,
    ctx: &CollectContext<'_>,
    options: &CollectOptions,
) -> Result<Artifacts, CollectError> {
    // 1. Catalog validation
    let graph = DeclarationGraph::build(catalog).map_err(collapse)?;
    fail_on(validate_catalog(catalog, &graph))?;

    // 2. Bundle resolution (unknown references are fatal)
    let bundle = catalog.resolve_bundle(bundle_id)?;

    // 3. Existing data
    let mut resolver = ExistingDataResolver::new(ctx.bag).with_cache(ctx.cache);
    if let Some(doc) = ctx.predefined {
        let name = options.predefined_bundle_name.as_deref().ok_or_else(|| {
            CollectError::parse(
                "C003",
                "A predefined bundle document was supplied without a predefined bundle name",
            )
        })?;
        resolver = resolver.with_predefined(doc, name);
    }

    // 4. Reconcile
    let mut rec = Reconciler::new(&resolver, options.mode)
        .with_input_prefix(options.input_prefix.as_str())
        .reconcile(&bundle);

    // 5. Reconciliation invariants
    fail_on(
        validate_reconciliation(&rec)
            .into_iter()
            .map(CollectError::from)
            .collect(),
    )?;

    // 6. Option filtering
    let filter = if options.apply_directory_filter {
        OptionFilter::new(ctx.directory, options.customer_id.as_str())
    } else {
        OptionFilter::without_directory()
    };
    let filtered = filter
        .for_bundle_size(bundle.components.len())
        .apply(&mut rec, &bundle)?;

    // 7. Artifacts
    let artifacts = assemble::assemble(&rec, &bundle, &resolver, &filtered, &options.input_prefix)?;
    tracing::info!(
        bundle_id,
        mode = %options.mode,
        needs_input = artifacts.form.needs_input(),
        "additional info collected"
    );
    Ok(artifacts)
}

fn collapse(errors: Vec<CollectError>) -> CollectError {
    CollectError::collapse(errors)
        .unwrap_or_else(|| CollectError::validate("S000", "Validation failed without a reported error", None))
}

fn fail_on(errors: Vec<CollectError>) -> Result<(), CollectError> {
    match CollectError::collapse(errors) {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Self-contained request: every collaborator supplied as data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub catalog: ServiceCatalog,
    pub bundle_id: String,
    #[serde(default)]
    pub bag: MemoryBundleBag,
    /// Predefined-bundle XML document.
    #[serde(default)]
    pub predefined: Option<String>,
    #[serde(default)]
    pub directory: MemoryDirectory,
    #[serde(default)]
    pub options: CollectOptions,
}

impl CollectRequest {
    pub fn from_json(json: &str) -> Result<Self, CollectError> {
        serde_json::from_str(json).map_err(|e| {
            CollectError::parse("P001", format!("Failed to parse collection request JSON: {}", e))
        })
    }

    pub fn run(&self) -> Result<Artifacts, CollectError> {
        let predefined = self
            .predefined
            .as_deref()
            .map(PredefinedBundles::parse)
            .transpose()?;
        let mut ctx = CollectContext::new(&self.bag, &self.directory);
        if let Some(doc) = predefined.as_ref() {
            ctx = ctx.with_predefined(doc);
        }
        collect(&self.catalog, &self.bundle_id, &ctx, &self.options)
    }
}
