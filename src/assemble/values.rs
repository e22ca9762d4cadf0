//! Default-value document: `<Body>` with one child per component.
//!
//! - components with saved data get their first bean's header values copied in;
//! - link members other than the canonical one get `link="<xpath>"` and
//!   `readOnly="true"` instead of a literal value;
//! - fields collapsed to a single option get that value literally;
//! - promptable fields get their current value when one is known.

use crate::error::CollectError;
use crate::filter::{FilterOutcome, FilteredOptions};
use crate::ir::types::*;
use crate::parse::xml::VALUE_ATTR;
use crate::resolve::ExistingDataResolver;
use crate::resolve::path::PathExpr;

pub fn build_value_document(
    rec: &Reconciliation,
    resolver: &ExistingDataResolver<'_>,
    filtered: &FilteredOptions,
) -> Result<ValueDocument, CollectError> {
    let mut doc = ValueDocument::new();

    for component in rec.components.iter().filter(|c| c.has_saved_data()) {
        copy_header(&mut doc, component, resolver);
    }

    for group in &rec.link_groups {
        if filtered.get(&group.canonical_ref) == Some(&FilterOutcome::Omitted) {
            tracing::warn!(field_id = %group.field_id, "canonical occurrence omitted, members left unlinked");
            continue;
        }
        let canonical = compile(&group.canonical_ref)?.to_xpath();
        for member in group.followers() {
            let node = doc.root.create(&compile(member)?);
            node.set_attribute(LINK_ATTR, canonical.as_str());
            node.set_attribute(READ_ONLY_ATTR, "true");
        }
    }

    for component in &rec.components {
        for candidate in &component.fields {
            if rec.disposition(&candidate.reference) != Some(Disposition::Canonical) {
                continue;
            }
            let value = match filtered.get(&candidate.reference) {
                Some(FilterOutcome::Single(entry)) => Some(entry.value.clone()),
                Some(FilterOutcome::Omitted) => None,
                _ => current_value(rec, candidate),
            };
            if let Some(value) = value {
                doc.root
                    .create(&compile(&candidate.reference)?)
                    .set_attribute(VALUE_ATTR, value);
            }
        }
    }

    Ok(doc)
}

/// The value a canonical input starts with: the link group's shared value, else its own.
pub fn current_value(rec: &Reconciliation, candidate: &PromptCandidate) -> Option<String> {
    rec.link_group(&candidate.field_id)
        .filter(|g| g.canonical_ref == candidate.reference)
        .and_then(|g| g.shared_value.clone())
        .or_else(|| candidate.existing.clone())
}

fn copy_header(doc: &mut ValueDocument, component: &ComponentPrompt, resolver: &ExistingDataResolver<'_>) {
    for (key, value) in resolver.header_fields(&component.component_id) {
        let reference = QualifiedRef::new(component.component_id.as_str(), key.as_str());
        match compile(&reference) {
            Ok(path) => doc.root.create(&path).set_attribute(VALUE_ATTR, value),
            Err(e) => {
                tracing::warn!(component_id = %component.component_id, key = %key, error = %e, "header value not copied");
            }
        }
    }
}

fn compile(reference: &QualifiedRef) -> Result<PathExpr, CollectError> {
    PathExpr::compile(&reference.to_string()).map_err(|e| {
        CollectError::assemble(
            "A001",
            format!("Cannot place '{}' in the value document: {}", reference, e),
            Some(reference.component_id.clone()),
        )
    })
}
