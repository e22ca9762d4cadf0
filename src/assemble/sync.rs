//! Link synchronisation scripts: one function per link group.
//!
//! The function is wired to the canonical input's change event and copies
//! its state into every other member input: the selection index for
//! enumerated fields, the raw value for text fields.

use crate::assemble::writer::ScriptWriter;
use crate::ir::types::{LinkGroup, SyncScript};
use crate::parse::types::DataKind;

pub fn sync_script(group: &LinkGroup, input_prefix: &str) -> SyncScript {
    let targets: Vec<String> = group.followers().map(|r| r.input_name(input_prefix)).collect();

    let mut w = ScriptWriter::new();
    w.function(&group.function_name, "fld");
    if group.kind == DataKind::Text {
        w.declare("val", Some("fld.value"));
    }
    w.declare("field", None);
    for target in &targets {
        w.select_input("field", target);
        match group.kind {
            DataKind::Enumerated => w.statement("field.selectedIndex = fld.selectedIndex"),
            DataKind::Text => w.statement("field.value = val"),
        };
    }
    w.end();

    SyncScript {
        function_name: group.function_name.clone(),
        field_id: group.field_id.clone(),
        kind: group.kind,
        source_input: group.canonical_ref.input_name(input_prefix),
        target_inputs: targets,
        code: w.finish(),
    }
}

/// Handler attached to a canonical input of a link group.
pub fn on_change(group: &LinkGroup) -> String {
    format!("{}(this)", group.function_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::QualifiedRef;

    fn group(kind: DataKind, path: &str) -> LinkGroup {
        LinkGroup {
            field_id: path.into(),
            canonical_ref: QualifiedRef::new("Loop", path),
            member_refs: vec![
                QualifiedRef::new("Loop", path),
                QualifiedRef::new("DS", path),
                QualifiedRef::new("EVC", path),
            ],
            kind,
            value_locked: false,
            shared_value: None,
            function_name: path.into(),
        }
    }

    #[test]
    fn select_sync_copies_index() {
        let script = sync_script(&group(DataKind::Enumerated, "Supplier"), "NFH_");
        assert_eq!(script.source_input, "NFH_Loop.Supplier");
        assert_eq!(script.target_inputs, vec!["NFH_DS.Supplier", "NFH_EVC.Supplier"]);
        insta::assert_snapshot!(script.code, @r#"
        function Supplier(fld) {
          var field;
          field = document.forms[0].elements["NFH_DS.Supplier"];
          field.selectedIndex = fld.selectedIndex;
          field = document.forms[0].elements["NFH_EVC.Supplier"];
          field.selectedIndex = fld.selectedIndex;
        }
        "#);
    }

    #[test]
    fn text_sync_copies_value() {
        let script = sync_script(&group(DataKind::Text, "PON"), "NFH_");
        insta::assert_snapshot!(script.code, @r#"
        function PON(fld) {
          var val = fld.value;
          var field;
          field = document.forms[0].elements["NFH_DS.PON"];
          field.value = val;
          field = document.forms[0].elements["NFH_EVC.PON"];
          field.value = val;
        }
        "#);
        assert_eq!(on_change(&group(DataKind::Text, "PON")), "PON(this)");
    }
}
