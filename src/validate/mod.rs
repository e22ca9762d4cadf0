//! Catalog validation phase (pre-reconciliation).
//!
//! Validates the loaded catalog before any bundle is reconciled.

pub mod definition_rules;
pub mod structural;

use crate::error::CollectError;
use crate::parse::graph::DeclarationGraph;
use crate::parse::types::{ComponentDef, FieldDef, ServiceCatalog};

/// Validate the entire catalog (structural + per-definition rules).
pub fn validate_catalog(catalog: &ServiceCatalog, graph: &DeclarationGraph) -> Vec<CollectError> {
    let mut errors = structural::validate_structural(catalog, graph);

    for field in &catalog.fields {
        errors.extend(validate_field(field));
    }
    for component in &catalog.components {
        errors.extend(validate_component(component));
    }

    errors
}

/// Validate a single field definition.
pub fn validate_field(field: &FieldDef) -> Vec<CollectError> {
    definition_rules::validate_field_def(field)
}

/// Validate a single component definition.
pub fn validate_component(component: &ComponentDef) -> Vec<CollectError> {
    definition_rules::validate_component_def(component)
}
