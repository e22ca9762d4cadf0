//! Catalog-level structural validation rules (S001–S006).

use std::collections::HashSet;

use crate::error::CollectError;
use crate::parse::graph::DeclarationGraph;
use crate::parse::types::ServiceCatalog;

/// Run all structural validation rules. Returns all errors found.
pub fn validate_structural(catalog: &ServiceCatalog, graph: &DeclarationGraph) -> Vec<CollectError> {
    let mut errors = Vec::new();

    s001_unique_field_ids(catalog, &mut errors);
    s002_unique_component_ids(catalog, &mut errors);
    s003_unique_bundle_ids(catalog, &mut errors);
    s004_no_repeated_bundle_members(catalog, &mut errors);
    s005_no_repeated_info_fields(catalog, graph, &mut errors);
    s006_bundles_not_empty(catalog, &mut errors);

    errors
}

fn s001_unique_field_ids(catalog: &ServiceCatalog, errors: &mut Vec<CollectError>) {
    let mut seen = HashSet::new();
    for field in &catalog.fields {
        if !seen.insert(field.id.as_str()) {
            errors.push(CollectError::validate(
                "S001",
                format!("Duplicate field id '{}'", field.id),
                None,
            ));
        }
    }
}

fn s002_unique_component_ids(catalog: &ServiceCatalog, errors: &mut Vec<CollectError>) {
    let mut seen = HashSet::new();
    for component in &catalog.components {
        if !seen.insert(component.id.as_str()) {
            errors.push(CollectError::validate(
                "S002",
                format!("Duplicate component id '{}'", component.id),
                Some(component.id.clone()),
            ));
        }
    }
}

fn s003_unique_bundle_ids(catalog: &ServiceCatalog, errors: &mut Vec<CollectError>) {
    let mut seen = HashSet::new();
    for bundle in &catalog.bundles {
        if !seen.insert(bundle.id.as_str()) {
            errors.push(CollectError::validate(
                "S003",
                format!("Duplicate bundle id '{}'", bundle.id),
                None,
            ));
        }
    }
}

fn s004_no_repeated_bundle_members(catalog: &ServiceCatalog, errors: &mut Vec<CollectError>) {
    for bundle in &catalog.bundles {
        let mut seen = HashSet::new();
        for component_id in &bundle.components {
            if !seen.insert(component_id.as_str()) {
                errors.push(CollectError::validate(
                    "S004",
                    format!(
                        "Bundle '{}' lists component '{}' more than once",
                        bundle.id, component_id
                    ),
                    Some(component_id.clone()),
                ));
            }
        }
    }
}

fn s005_no_repeated_info_fields(
    catalog: &ServiceCatalog,
    graph: &DeclarationGraph,
    errors: &mut Vec<CollectError>,
) {
    for component in &catalog.components {
        let mut reported = HashSet::new();
        for field_id in &component.info_fields {
            if graph.info_declaration_count(&component.id, field_id) > 1
                && reported.insert(field_id.as_str())
            {
                errors.push(CollectError::validate(
                    "S005",
                    format!(
                        "Component '{}' declares field '{}' more than once",
                        component.id, field_id
                    ),
                    Some(component.id.clone()),
                ));
            }
        }
    }
}

fn s006_bundles_not_empty(catalog: &ServiceCatalog, errors: &mut Vec<CollectError>) {
    for bundle in &catalog.bundles {
        if bundle.components.is_empty() {
            errors.push(CollectError::validate(
                "S006",
                format!("Bundle '{}' has no components", bundle.id),
                None,
            ));
        }
    }
}
