//! Parse phase: catalog JSON → schema types + declaration graph, and the
//! predefined-bundle XML document.

pub mod catalog;
pub mod graph;
pub mod predefined;
pub mod types;
pub mod xml;

pub use graph::DeclarationGraph;
pub use predefined::PredefinedBundles;
pub use types::*;

use crate::error::CollectError;

/// Deserialize a service catalog JSON string.
pub fn parse_catalog(json: &str) -> Result<ServiceCatalog, Vec<CollectError>> {
    serde_json::from_str::<ServiceCatalog>(json).map_err(|e| {
        vec![CollectError::parse(
            "P001",
            format!("Failed to parse service catalog JSON: {}", e),
        )]
    })
}

/// Parse JSON and build the declaration graph in one step.
pub fn parse_and_build(json: &str) -> Result<(ServiceCatalog, DeclarationGraph), Vec<CollectError>> {
    let catalog = parse_catalog(json)?;
    let graph = DeclarationGraph::build(&catalog)?;
    Ok((catalog, graph))
}
