//! Prompt form tree: one section per component with at least one input.

use crate::assemble::sync::on_change;
use crate::assemble::values::current_value;
use crate::filter::{FilterOutcome, FilteredOptions};
use crate::ir::types::*;
use crate::parse::types::{DataType, FieldDef, OptionSource, ResolvedBundle};

pub const MESSAGE_ID: &str = "AdditionalInfoMsg";
pub const FORM_ID: &str = "AdditionalInfoForm";

pub struct FormBuilder<'a> {
    rec: &'a Reconciliation,
    bundle: &'a ResolvedBundle<'a>,
    filtered: &'a FilteredOptions,
    input_prefix: &'a str,
}

impl<'a> FormBuilder<'a> {
    pub fn new(
        rec: &'a Reconciliation,
        bundle: &'a ResolvedBundle<'a>,
        filtered: &'a FilteredOptions,
        input_prefix: &'a str,
    ) -> Self {
        Self {
            rec,
            bundle,
            filtered,
            input_prefix,
        }
    }

    pub fn build(&self) -> FormTree {
        let sections = self
            .rec
            .components
            .iter()
            .filter_map(|c| self.section(c))
            .collect();
        FormTree {
            message_id: MESSAGE_ID.to_string(),
            form_id: FORM_ID.to_string(),
            sections,
        }
    }

    fn section(&self, component: &ComponentPrompt) -> Option<FormSection> {
        let fields: Vec<FormField> = component
            .fields
            .iter()
            .filter_map(|candidate| self.field(component, candidate))
            .collect();
        if fields.is_empty() {
            return None;
        }
        Some(FormSection {
            id: component.component_id.clone(),
            display_name: component.display_name.clone(),
            full_name: component.full_name.clone(),
            occurrence: component.occurrence_control.clone(),
            fields,
        })
    }

    fn field(&self, component: &ComponentPrompt, candidate: &PromptCandidate) -> Option<FormField> {
        let def = self.bundle.field(&candidate.field_id)?;
        match self.rec.disposition(&candidate.reference)? {
            Disposition::Canonical => self.canonical_field(component, candidate, def),
            Disposition::LinkMember => self.mirror_field(candidate, def),
            Disposition::ExcludedByPartyRule
            | Disposition::ExcludedByExistingValue
            | Disposition::OmittedByFilter => None,
        }
    }

    /// The options a canonical occurrence renders with, or `None` when it is not rendered.
    fn rendered_options(&self, reference: &QualifiedRef, def: &'a FieldDef) -> Option<Option<OptionSource>> {
        match (&def.data_type, self.filtered.get(reference)) {
            (DataType::Text { .. }, _) => Some(None),
            (_, Some(FilterOutcome::Options(options))) => Some(Some(options.clone())),
            (_, Some(FilterOutcome::Single(_)) | Some(FilterOutcome::Omitted)) => None,
            (DataType::Enumerated { options }, None) => Some(Some(options.clone())),
        }
    }

    fn canonical_field(
        &self,
        component: &ComponentPrompt,
        candidate: &PromptCandidate,
        def: &'a FieldDef,
    ) -> Option<FormField> {
        let options = self.rendered_options(&candidate.reference, def)?;
        let group = self
            .rec
            .link_group(&candidate.field_id)
            .filter(|g| g.canonical_ref == candidate.reference);
        let read_only = component.read_only;
        let locked = group.is_some_and(|g| g.value_locked);
        let value = current_value(self.rec, candidate);

        let input = match options {
            None => InputKind::Text {
                max_len: text_max_len(def),
            },
            Some(options) => InputKind::Select {
                options: render_options(&options, value.as_deref(), locked),
            },
        };
        let is_select = matches!(input, InputKind::Select { .. });

        Some(FormField {
            field_id: candidate.field_id.clone(),
            input_name: candidate.reference.input_name(self.input_prefix),
            path: candidate.reference.to_string(),
            display_name: def.display_name.clone(),
            full_name: def.full_name().to_string(),
            role: if read_only { FieldRole::Prohibited } else { FieldRole::Required },
            input,
            disabled: read_only || locked,
            on_change: group.map(on_change),
            show_empty_value: is_select && !read_only && !locked && value.is_none(),
            value,
        })
    }

    /// Hidden input mirroring the canonical occurrence, present only while the canonical one is rendered.
    fn mirror_field(&self, candidate: &PromptCandidate, def: &'a FieldDef) -> Option<FormField> {
        let group = self.rec.link_group(&candidate.field_id)?;
        let options = self.rendered_options(&group.canonical_ref, def)?;
        let value = group.shared_value.clone();
        let input = match options {
            None => InputKind::Text {
                max_len: text_max_len(def),
            },
            Some(options) => InputKind::Select {
                options: render_options(&options, value.as_deref(), group.value_locked),
            },
        };

        Some(FormField {
            field_id: candidate.field_id.clone(),
            input_name: candidate.reference.input_name(self.input_prefix),
            path: candidate.reference.to_string(),
            display_name: def.display_name.clone(),
            full_name: def.full_name().to_string(),
            role: FieldRole::Hidden,
            input,
            disabled: group.value_locked,
            on_change: None,
            show_empty_value: false,
            value,
        })
    }
}

fn text_max_len(def: &FieldDef) -> Option<u32> {
    match def.data_type {
        DataType::Text { max_len } => max_len,
        DataType::Enumerated { .. } => None,
    }
}

/// Locked selects offer only the current value. Selection matches case-insensitively.
pub fn render_options(options: &OptionSource, current: Option<&str>, locked: bool) -> Vec<RenderedOption> {
    let is_current = |value: &str| current.is_some_and(|c| c.eq_ignore_ascii_case(value));

    if locked {
        if let Some(current) = current {
            let only = match options.entries.iter().find(|e| is_current(&e.value)) {
                Some(e) => RenderedOption {
                    value: e.value.clone(),
                    display: e.display().to_string(),
                    selected: true,
                },
                None => RenderedOption {
                    value: current.to_string(),
                    display: current.to_string(),
                    selected: true,
                },
            };
            return vec![only];
        }
    }

    options
        .entries
        .iter()
        .map(|e| RenderedOption {
            value: e.value.clone(),
            display: e.display().to_string(),
            selected: is_current(&e.value),
        })
        .collect()
}
