#![allow(dead_code)]

use addinfo::filter::MemoryDirectory;
use addinfo::ir::*;
use addinfo::parse::{self, PredefinedBundles, ServiceCatalog};
use addinfo::resolve::{ComponentBean, MemoryBundleBag, PathCache};
use addinfo::{CollectContext, CollectError, CollectOptions, collect};

// =============================================================================
// Fixtures
// =============================================================================

pub fn catalog_json() -> &'static str {
    include_str!("../fixtures/catalog.json")
}

pub fn catalog() -> ServiceCatalog {
    parse::parse_catalog(catalog_json()).expect("fixture catalog should parse")
}

pub fn directory() -> MemoryDirectory {
    serde_json::from_str(include_str!("../fixtures/directory.json"))
        .expect("fixture directory should parse")
}

pub fn predefined_xml() -> &'static str {
    include_str!("../fixtures/predefined.xml")
}

pub fn predefined() -> PredefinedBundles {
    PredefinedBundles::parse(predefined_xml()).expect("fixture document should parse")
}

// =============================================================================
// Bags
// =============================================================================

pub fn empty_bag() -> MemoryBundleBag {
    MemoryBundleBag::new()
}

/// Bag holding one saved occurrence of `component_id` with the given header.
pub fn bag_with(component_id: &str, header: &[(&str, &str)]) -> MemoryBundleBag {
    let mut bag = MemoryBundleBag::new();
    bag.add(component_id, ComponentBean::with_header(header.iter().copied()));
    bag
}

// =============================================================================
// Pipeline runners
// =============================================================================

/// Run the pipeline against the fixture catalog and directory with a private cache.
pub fn run(
    bundle_id: &str,
    bag: &MemoryBundleBag,
    options: &CollectOptions,
) -> Result<Artifacts, CollectError> {
    let catalog = catalog();
    let directory = directory();
    let cache = PathCache::new();
    let ctx = CollectContext::new(bag, &directory).with_cache(&cache);
    collect(&catalog, bundle_id, &ctx, options)
}

/// Like [`run`], with the fixture predefined document selected as bundle `Basic`.
pub fn run_with_predefined(
    bundle_id: &str,
    bag: &MemoryBundleBag,
    options: &CollectOptions,
) -> Result<Artifacts, CollectError> {
    let catalog = catalog();
    let directory = directory();
    let doc = predefined();
    let cache = PathCache::new();
    let ctx = CollectContext::new(bag, &directory)
        .with_predefined(&doc)
        .with_cache(&cache);
    let options = options.clone().with_predefined_bundle("Basic");
    collect(&catalog, bundle_id, &ctx, &options)
}

// =============================================================================
// Assertions
// =============================================================================

/// Input names of every field rendered to the operator.
pub fn promptable_inputs(form: &FormTree) -> Vec<String> {
    form.promptable_fields().map(|f| f.input_name.clone()).collect()
}

pub fn option_values(field: &FormField) -> Vec<String> {
    match &field.input {
        InputKind::Select { options } => options.iter().map(|o| o.value.clone()).collect(),
        InputKind::Text { .. } => panic!("field '{}' is not a select", field.input_name),
    }
}
