//! Linked-field registry built during one reconciliation pass.
//!
//! Keyed by field-definition id. The first member registered for an id is the
//! canonical occurrence; every later member links to it.

use indexmap::IndexMap;

use crate::ir::types::{LinkGroup, QualifiedRef};
use crate::parse::types::{FieldDef, FieldId};

#[derive(Debug, Clone)]
pub struct Member {
    pub reference: QualifiedRef,
    pub existing: Option<String>,
    /// The member's component is read-only, which locks the group.
    pub saved: bool,
}

#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub field: &'a FieldDef,
    pub members: Vec<Member>,
}

impl Entry<'_> {
    pub fn canonical(&self) -> Option<&Member> {
        self.members.first()
    }

    pub fn is_linked(&self) -> bool {
        self.members.len() > 1
    }
}

#[derive(Debug, Default)]
pub struct FieldRegistry<'a> {
    entries: IndexMap<FieldId, Entry<'a>>,
}

impl<'a> FieldRegistry<'a> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Register an accepted occurrence. Returns true when it joined an existing entry.
    pub fn register(&mut self, field: &'a FieldDef, member: Member) -> bool {
        match self.entries.get_mut(&field.id) {
            Some(entry) => {
                entry.members.push(member);
                true
            }
            None => {
                self.entries.insert(
                    field.id.clone(),
                    Entry {
                        field,
                        members: vec![member],
                    },
                );
                false
            }
        }
    }

    /// Remove a previously accepted occurrence. The next member, if any, becomes canonical.
    pub fn retract(&mut self, field_id: &str, reference: &QualifiedRef) -> bool {
        let Some(entry) = self.entries.get_mut(field_id) else {
            return false;
        };
        let before = entry.members.len();
        entry.members.retain(|m| &m.reference != reference);
        let removed = entry.members.len() != before;
        if entry.members.is_empty() {
            self.entries.shift_remove(field_id);
        }
        removed
    }

    pub fn get(&self, field_id: &str) -> Option<&Entry<'a>> {
        self.entries.get(field_id)
    }

    pub fn is_canonical(&self, field_id: &str, reference: &QualifiedRef) -> bool {
        self.get(field_id)
            .and_then(|e| e.canonical())
            .is_some_and(|m| &m.reference == reference)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry<'a>> {
        self.entries.values()
    }

    /// Link groups for every entry with two or more members, in first-seen order.
    pub fn link_groups(&self) -> Vec<LinkGroup> {
        self.entries()
            .filter(|e| e.is_linked())
            .filter_map(|e| {
                let canonical = e.canonical()?;
                Some(LinkGroup {
                    field_id: e.field.id.clone(),
                    canonical_ref: canonical.reference.clone(),
                    member_refs: e.members.iter().map(|m| m.reference.clone()).collect(),
                    kind: e.field.data_type.kind(),
                    value_locked: e.members.iter().any(|m| m.saved),
                    shared_value: e.members.iter().find_map(|m| m.existing.clone()),
                    function_name: sync_function_name(&e.field.path),
                })
            })
            .collect()
    }
}

/// Field path turned into a script identifier.
pub fn sync_function_name(path: &str) -> String {
    let mut name: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
