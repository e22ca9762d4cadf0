//! Assemble phase: Reconciliation + filtered options → Artifacts.
//!
//! Public API: `assemble(...) -> Result<Artifacts, CollectError>`

pub mod form;
pub mod sync;
pub mod values;
mod writer;

use crate::error::CollectError;
use crate::filter::FilteredOptions;
use crate::ir::types::*;
use crate::parse::types::ResolvedBundle;
use crate::resolve::ExistingDataResolver;

pub use form::{FORM_ID, FormBuilder, MESSAGE_ID};

/// Build the form tree, the value document and the sync scripts.
pub fn assemble(
    rec: &Reconciliation,
    bundle: &ResolvedBundle<'_>,
    resolver: &ExistingDataResolver<'_>,
    filtered: &FilteredOptions,
    input_prefix: &str,
) -> Result<Artifacts, CollectError> {
    let form = FormBuilder::new(rec, bundle, filtered, input_prefix).build();
    let values = values::build_value_document(rec, resolver, filtered)?;

    // Scripts only for groups whose canonical input is on the form
    let sync_scripts: Vec<SyncScript> = rec
        .link_groups
        .iter()
        .filter(|g| form.field(&g.canonical_ref.input_name(input_prefix)).is_some())
        .map(|g| sync::sync_script(g, input_prefix))
        .collect();

    tracing::debug!(
        bundle_id = %rec.bundle_id,
        sections = form.sections.len(),
        sync_scripts = sync_scripts.len(),
        needs_input = form.needs_input(),
        "artifacts assembled"
    );

    Ok(Artifacts {
        form,
        values,
        sync_scripts,
    })
}
