//! Per-definition validation of fields and components (D001–D004).

use crate::error::CollectError;
use crate::parse::types::*;
use crate::resolve::path::PathExpr;

/// Validate a single field definition. Returns all errors found.
pub fn validate_field_def(field: &FieldDef) -> Vec<CollectError> {
    let mut errors = Vec::new();

    if let Err(e) = PathExpr::compile(&field.path) {
        errors.push(CollectError::validate(
            "D001",
            format!("Field '{}' has an invalid path: {}", field.id, e),
            None,
        ));
    }

    match &field.data_type {
        // Party fields may leave their static list empty; the directory fills it.
        DataType::Enumerated { options } if options.is_empty() && !field.party().is_party() => {
            errors.push(CollectError::validate(
                "D002",
                format!("Enumerated field '{}' declares no options", field.id),
                None,
            ));
        }
        DataType::Text { max_len: Some(0) } => {
            errors.push(CollectError::validate(
                "D003",
                format!("Text field '{}' has a maximum length of 0", field.id),
                None,
            ));
        }
        _ => {}
    }

    errors
}

/// Validate a single component definition. Returns all errors found.
pub fn validate_component_def(component: &ComponentDef) -> Vec<CollectError> {
    let mut errors = Vec::new();

    if let Some(max) = component.max_occurs {
        if component.min_occurs > max {
            errors.push(CollectError::validate(
                "D004",
                format!(
                    "Component '{}' has minOccurs {} above maxOccurs {}",
                    component.id, component.min_occurs, max
                ),
                Some(component.id.clone()),
            ));
        }
    }

    errors
}
