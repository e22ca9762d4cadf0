//! IR type definitions for additional-info collection.
//!
//! The reconciliation result bridges the bundle schema (input) and the three
//! emitted artifacts (output): the prompt form tree, the default-value
//! document, and the link synchronisation scripts. Everything here is built
//! fresh for each request.

use serde::{Deserialize, Serialize};

use crate::config::CollectMode;
use crate::parse::types::{DataKind, FieldId};
use crate::parse::xml::{VALUE_ATTR, XmlNode};
use crate::resolve::path::PathExpr;

// =============================================================================
// REFERENCES
// =============================================================================

/// A field occurrence inside one component: `componentId.fieldPath`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedRef {
    pub component_id: String,
    pub field_path: String,
}

impl QualifiedRef {
    pub fn new(component_id: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            field_path: field_path.into(),
        }
    }

    /// Name of the form input bound to this occurrence.
    pub fn input_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self)
    }
}

impl std::fmt::Display for QualifiedRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.component_id, self.field_path)
    }
}

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Complete result of one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub bundle_id: String,
    pub mode: CollectMode,
    /// Components that take part in prompting, in bundle order.
    pub components: Vec<ComponentPrompt>,
    /// Linked fields in first-seen order.
    pub link_groups: Vec<LinkGroup>,
    /// Exactly one entry per field occurrence the pass touched.
    pub dispositions: Vec<FieldDisposition>,
}

impl Reconciliation {
    pub fn component(&self, component_id: &str) -> Option<&ComponentPrompt> {
        self.components.iter().find(|c| c.component_id == component_id)
    }

    pub fn link_group(&self, field_id: &str) -> Option<&LinkGroup> {
        self.link_groups.iter().find(|g| g.field_id == field_id)
    }

    pub fn disposition(&self, reference: &QualifiedRef) -> Option<Disposition> {
        self.dispositions
            .iter()
            .find(|d| &d.reference == reference)
            .map(|d| d.disposition)
    }

    /// Drop a canonical occurrence the option filter left without candidates.
    ///
    /// The occurrence leaves its link group. If it was the group's canonical
    /// member, the next member takes over and is returned. A group left with a
    /// single member dissolves.
    pub fn omit(&mut self, reference: &QualifiedRef) -> Option<QualifiedRef> {
        self.set_disposition(reference, Disposition::OmittedByFilter);

        let index = self.link_groups.iter().position(|g| g.contains(reference))?;
        let mut group = self.link_groups.remove(index);
        group.member_refs.retain(|r| r != reference);

        let promoted = match group.member_refs.first() {
            Some(next) if group.canonical_ref == *reference => {
                group.canonical_ref = next.clone();
                self.set_disposition(next, Disposition::Canonical);
                Some(next.clone())
            }
            _ => None,
        };

        if group.member_refs.len() > 1 {
            group.shared_value = group
                .member_refs
                .iter()
                .find_map(|r| self.candidate(r).and_then(|c| c.existing.clone()));
            group.value_locked = group
                .member_refs
                .iter()
                .any(|r| self.component(&r.component_id).is_some_and(|c| c.read_only));
            self.link_groups.insert(index, group);
        }
        promoted
    }

    fn candidate(&self, reference: &QualifiedRef) -> Option<&PromptCandidate> {
        self.component(&reference.component_id)?
            .fields
            .iter()
            .find(|f| &f.reference == reference)
    }

    fn set_disposition(&mut self, reference: &QualifiedRef, disposition: Disposition) {
        if let Some(d) = self.dispositions.iter_mut().find(|d| &d.reference == reference) {
            d.disposition = disposition;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentPrompt {
    pub component_id: String,
    pub display_name: String,
    pub full_name: String,
    /// Occurrences from live beans, else the predefined count.
    pub occurrences: usize,
    /// Occurrences backed by live beans only. Non-zero means saved data exists.
    pub live_occurrences: usize,
    /// Saved data exists and every field is being shown (`All` mode): inputs may not be edited.
    pub read_only: bool,
    /// Present in `All` mode only.
    pub occurrence_control: Option<OccurrenceControl>,
    /// Accepted field occurrences in declaration order.
    pub fields: Vec<PromptCandidate>,
}

impl ComponentPrompt {
    pub fn has_saved_data(&self) -> bool {
        self.live_occurrences > 0
    }
}

/// Occurrence-count input attached to each component in `All` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceControl {
    pub input_name: String,
    pub current: usize,
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl OccurrenceControl {
    /// Client-side bounds check wired to the count input.
    pub fn on_change(&self) -> String {
        let max = self.max.map_or_else(|| "-1".to_string(), |m| m.to_string());
        format!("return ComponentCount(this,{},{});", self.min, max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCandidate {
    pub field_id: FieldId,
    pub path: String,
    pub reference: QualifiedRef,
    pub kind: DataKind,
    /// Value resolved from beans or the predefined document.
    pub existing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Rendered input for the field.
    Canonical,
    /// Mirrors the canonical occurrence of a link group.
    LinkMember,
    /// Dropped by the Supplier/TradingPartnerName rule.
    ExcludedByPartyRule,
    /// `Needed` mode only: a value already exists.
    ExcludedByExistingValue,
    /// Canonical occurrence left without candidates by the option filter.
    OmittedByFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDisposition {
    pub field_id: FieldId,
    pub reference: QualifiedRef,
    pub disposition: Disposition,
}

/// A field definition shared by two or more components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGroup {
    pub field_id: FieldId,
    pub canonical_ref: QualifiedRef,
    /// Every member including the canonical one, in iteration order.
    pub member_refs: Vec<QualifiedRef>,
    pub kind: DataKind,
    /// Some member component already holds saved data.
    pub value_locked: bool,
    /// First non-empty existing value among the members.
    pub shared_value: Option<String>,
    /// Name of the generated synchronisation function.
    pub function_name: String,
}

impl LinkGroup {
    pub fn contains(&self, reference: &QualifiedRef) -> bool {
        self.member_refs.contains(reference)
    }

    pub fn followers(&self) -> impl Iterator<Item = &QualifiedRef> {
        self.member_refs.iter().filter(|r| **r != self.canonical_ref)
    }
}

// =============================================================================
// FORM TREE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    /// Needs operator input.
    Required,
    /// Already resolved; shown but not editable.
    Prohibited,
    /// Mirror input kept in sync with a canonical field; never shown.
    Hidden,
}

/// Synthetic message → form → section → field hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTree {
    pub message_id: String,
    pub form_id: String,
    pub sections: Vec<FormSection>,
}

impl FormTree {
    /// At least one field asks the operator for input.
    pub fn needs_input(&self) -> bool {
        self.fields().any(|f| f.role == FieldRole::Required)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Fields rendered to the operator (everything except hidden mirrors).
    pub fn promptable_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields().filter(|f| f.role != FieldRole::Hidden)
    }

    pub fn field(&self, input_name: &str) -> Option<&FormField> {
        self.fields().find(|f| f.input_name == input_name)
    }

    pub fn section(&self, id: &str) -> Option<&FormSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSection {
    /// Same id as the component.
    pub id: String,
    pub display_name: String,
    pub full_name: String,
    pub occurrence: Option<OccurrenceControl>,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub field_id: FieldId,
    pub input_name: String,
    /// Path of the value in the value document, `componentId.fieldPath`.
    pub path: String,
    pub display_name: String,
    pub full_name: String,
    pub role: FieldRole,
    pub input: InputKind,
    pub disabled: bool,
    pub on_change: Option<String>,
    pub value: Option<String>,
    pub show_empty_value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputKind {
    Text { max_len: Option<u32> },
    Select { options: Vec<RenderedOption> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOption {
    pub value: String,
    pub display: String,
    pub selected: bool,
}

// =============================================================================
// VALUE DOCUMENT
// =============================================================================

/// Root element of the default-value document.
pub const VALUE_ROOT: &str = "Body";
/// Attribute holding the XPath of the canonical field a member mirrors.
pub const LINK_ATTR: &str = "link";
pub const READ_ONLY_ATTR: &str = "readOnly";

/// XML-shaped default values consumed by the templating layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDocument {
    pub root: XmlNode,
}

impl ValueDocument {
    pub fn new() -> Self {
        Self {
            root: XmlNode::new(VALUE_ROOT),
        }
    }

    pub fn node(&self, path: &str) -> Option<&XmlNode> {
        let path = PathExpr::compile(path).ok()?;
        self.root.find(&path)
    }

    pub fn value(&self, path: &str) -> Option<&str> {
        self.node(path).and_then(|n| n.attribute(VALUE_ATTR))
    }

    pub fn link(&self, path: &str) -> Option<&str> {
        self.node(path).and_then(|n| n.attribute(LINK_ATTR))
    }
}

impl Default for ValueDocument {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SYNC SCRIPTS & ARTIFACTS
// =============================================================================

/// One generated client-side function keeping a link group's inputs equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncScript {
    pub function_name: String,
    pub field_id: FieldId,
    pub kind: DataKind,
    pub source_input: String,
    pub target_inputs: Vec<String>,
    pub code: String,
}

/// Everything the downstream rendering layer needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifacts {
    pub form: FormTree,
    pub values: ValueDocument,
    pub sync_scripts: Vec<SyncScript>,
}

impl Artifacts {
    /// All sync functions concatenated, or `None` when nothing is linked.
    pub fn sync_source(&self) -> Option<String> {
        if self.sync_scripts.is_empty() {
            return None;
        }
        let bodies: Vec<&str> = self.sync_scripts.iter().map(|s| s.code.as_str()).collect();
        Some(bodies.join("\n"))
    }
}
