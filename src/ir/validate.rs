//! Reconciliation invariant validation.
//!
//! Checks that a `Reconciliation` is internally consistent before options are
//! filtered and artifacts are assembled.

use std::collections::{HashMap, HashSet};

use crate::ir::types::*;
use crate::parse::types::Party;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
    /// The component where the error was found, if applicable.
    pub component_id: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.component_id {
            Some(id) => write!(f, "[{}] {} (in component '{}')", self.code, self.message, id),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Validate a reconciliation result. Returns all errors found.
pub fn validate_reconciliation(rec: &Reconciliation) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_single_disposition(rec, &mut errors);
    validate_canonical_uniqueness(rec, &mut errors);
    validate_link_groups(rec, &mut errors);
    validate_party_exclusion(rec, &mut errors);

    errors
}

// ---------------------------------------------------------------------------
// Invariant: every touched field occurrence has exactly one disposition
// ---------------------------------------------------------------------------

fn validate_single_disposition(rec: &Reconciliation, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for d in &rec.dispositions {
        if !seen.insert(&d.reference) {
            errors.push(ValidationError {
                code: "E001",
                message: format!("Field occurrence '{}' has more than one disposition", d.reference),
                component_id: Some(d.reference.component_id.clone()),
            });
        }
    }

    for component in &rec.components {
        for field in &component.fields {
            if !seen.contains(&field.reference) {
                errors.push(ValidationError {
                    code: "E001",
                    message: format!("Field occurrence '{}' has no disposition", field.reference),
                    component_id: Some(component.component_id.clone()),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: a field definition is canonical in at most one occurrence
// ---------------------------------------------------------------------------

fn validate_canonical_uniqueness(rec: &Reconciliation, errors: &mut Vec<ValidationError>) {
    let mut canonical: HashMap<&str, &QualifiedRef> = HashMap::new();
    for d in &rec.dispositions {
        if d.disposition != Disposition::Canonical {
            continue;
        }
        if let Some(first) = canonical.insert(d.field_id.as_str(), &d.reference) {
            errors.push(ValidationError {
                code: "E002",
                message: format!(
                    "Field '{}' is canonical in both '{}' and '{}'",
                    d.field_id, first, d.reference
                ),
                component_id: Some(d.reference.component_id.clone()),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: link groups have two or more members, one canonical
// ---------------------------------------------------------------------------

fn validate_link_groups(rec: &Reconciliation, errors: &mut Vec<ValidationError>) {
    for group in &rec.link_groups {
        let unique: HashSet<&str> = group
            .member_refs
            .iter()
            .map(|r| r.component_id.as_str())
            .collect();
        if unique.len() < 2 || unique.len() != group.member_refs.len() {
            errors.push(ValidationError {
                code: "E003",
                message: format!(
                    "Link group '{}' must have at least two members from distinct components",
                    group.field_id
                ),
                component_id: None,
            });
        }
        if !group.contains(&group.canonical_ref) {
            errors.push(ValidationError {
                code: "E003",
                message: format!(
                    "Link group '{}' does not contain its canonical occurrence '{}'",
                    group.field_id, group.canonical_ref
                ),
                component_id: Some(group.canonical_ref.component_id.clone()),
            });
        }
        for member in &group.member_refs {
            let expected = if *member == group.canonical_ref {
                Disposition::Canonical
            } else {
                Disposition::LinkMember
            };
            if rec.disposition(member) != Some(expected) {
                errors.push(ValidationError {
                    code: "E003",
                    message: format!(
                        "Link group '{}' member '{}' should be {:?}",
                        group.field_id, member, expected
                    ),
                    component_id: Some(member.component_id.clone()),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant: no component accepts both Supplier and TradingPartnerName
// ---------------------------------------------------------------------------

fn validate_party_exclusion(rec: &Reconciliation, errors: &mut Vec<ValidationError>) {
    for component in &rec.components {
        let parties: HashSet<Party> = component
            .fields
            .iter()
            .map(|f| Party::of(&f.path))
            .filter(|p| p.is_party())
            .collect();
        if parties.len() > 1 {
            errors.push(ValidationError {
                code: "E004",
                message: "Component accepts both Supplier and TradingPartnerName".into(),
                component_id: Some(component.component_id.clone()),
            });
        }
    }
}
