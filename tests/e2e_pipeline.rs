//! End-to-end tests: catalog + bag + directory → Artifacts through `collect`.

mod helpers;

use addinfo::ir::*;
use addinfo::resolve::{ComponentBean, MemoryBundleBag};
use addinfo::{CollectMode, CollectOptions, CollectRequest, Phase};

#[test]
fn shared_supplier_is_asked_once() {
    let artifacts = helpers::run("Basic", &helpers::empty_bag(), &CollectOptions::default()).unwrap();

    let supplier_inputs: Vec<&FormField> = artifacts
        .form
        .promptable_fields()
        .filter(|f| f.field_id == "Supplier")
        .collect();
    assert_eq!(supplier_inputs.len(), 1);
    assert_eq!(supplier_inputs[0].input_name, "NFH_Loop.Supplier");

    let supplier = artifacts
        .sync_scripts
        .iter()
        .find(|s| s.function_name == "Supplier")
        .unwrap();
    assert_eq!(supplier.source_input, "NFH_Loop.Supplier");
    assert_eq!(supplier.target_inputs, vec!["NFH_DS.Supplier"]);
    assert!(supplier.code.starts_with("function Supplier(fld) {"));
}

#[test]
fn single_trading_partner_is_written_directly() {
    let artifacts = helpers::run("Single", &helpers::empty_bag(), &CollectOptions::default()).unwrap();

    assert!(!artifacts.form.needs_input());
    assert!(artifacts.form.sections.is_empty());
    assert!(artifacts.form.field("NFH_X.TradingPartnerName").is_none());
    assert_eq!(artifacts.values.value("X.TradingPartnerName"), Some("A"));
    assert!(artifacts.values.node("X.Supplier").is_none());
    assert!(artifacts.sync_source().is_none());
}

#[test]
fn trading_partner_select_when_several_candidates() {
    let artifacts = helpers::run("Ethernet", &helpers::empty_bag(), &CollectOptions::default()).unwrap();
    let form = &artifacts.form;

    let tp = form.field("NFH_EVC.TradingPartnerName").unwrap();
    assert_eq!(helpers::option_values(tp), vec!["A", "B"]);
    assert!(form.field("NFH_EVC.Supplier").is_none());

    let ds_supplier = form.field("NFH_DS.Supplier").unwrap();
    assert_eq!(ds_supplier.role, FieldRole::Required);
    assert_eq!(helpers::option_values(ds_supplier), vec!["ATT", "QWEST", "VZ"]);
}

#[test]
fn needed_mode_prompts_only_missing_fields() {
    let options = CollectOptions::default().with_mode(CollectMode::Needed);
    let artifacts = helpers::run_with_predefined("Basic", &helpers::empty_bag(), &options).unwrap();
    let form = &artifacts.form;

    assert_eq!(
        helpers::promptable_inputs(form),
        vec!["NFH_Loop.Speed", "NFH_Loop.Contact.Name", "NFH_DS.Supplier"]
    );
    assert!(form.sections.iter().all(|s| s.occurrence.is_none()));
    assert_eq!(form.field("NFH_DS.Contact.Name").unwrap().role, FieldRole::Hidden);
    assert_eq!(artifacts.values.link("DS.Contact.Name"), Some("//Loop/Contact/Name"));
}

#[test]
fn needed_mode_is_stable_across_runs() {
    let options = CollectOptions::default().with_mode(CollectMode::Needed);
    let bag = helpers::bag_with("Loop", &[("Supplier", "VZ"), ("PON", "P-7")]);
    let first = helpers::run_with_predefined("Basic", &bag, &options).unwrap();
    let second = helpers::run_with_predefined("Basic", &bag, &options).unwrap();
    assert_eq!(
        helpers::promptable_inputs(&first.form),
        helpers::promptable_inputs(&second.form)
    );
    assert_eq!(first.values, second.values);

    let speed = first.form.field("NFH_Loop.Speed").unwrap();
    assert_eq!(speed.role, FieldRole::Required);
    assert!(!speed.disabled);
}

#[test]
fn needed_mode_asks_saved_components_for_missing_values() {
    let options = CollectOptions::default().with_mode(CollectMode::Needed);
    let mut bag = MemoryBundleBag::new();
    bag.add("Loop", ComponentBean::with_header([("Supplier", "VZ"), ("PON", "P-7")]));
    bag.add("DS", ComponentBean::default());
    let artifacts = helpers::run("Basic", &bag, &options).unwrap();
    let form = &artifacts.form;

    assert!(form.needs_input());
    assert_eq!(
        helpers::promptable_inputs(form),
        vec!["NFH_Loop.Speed", "NFH_Loop.Contact.Name", "NFH_DS.Supplier"]
    );
    for field in form.promptable_fields() {
        assert_eq!(field.role, FieldRole::Required, "{}", field.input_name);
        assert!(!field.disabled, "{}", field.input_name);
    }
    assert_eq!(form.field("NFH_DS.Contact.Name").unwrap().role, FieldRole::Hidden);
}

#[test]
fn empty_trading_partner_list_fails_single_component_bundle() {
    let catalog = helpers::catalog();
    let mut directory = helpers::directory();
    directory
        .customer_mut("DEFAULT")
        .with_trading_partners("X", Vec::<String>::new());
    let bag = helpers::empty_bag();
    let ctx = addinfo::CollectContext::new(&bag, &directory);
    let err = addinfo::collect(&catalog, "Single", &ctx, &CollectOptions::default()).unwrap_err();
    assert_eq!(err.code, "F002");
    assert_eq!(err.phase, Phase::Filter);
    assert_eq!(err.component_id.as_deref(), Some("X"));
}

#[test]
fn unknown_customer_fails() {
    let options = CollectOptions::default().with_customer("ACME");
    let err = helpers::run("Basic", &helpers::empty_bag(), &options).unwrap_err();
    assert_eq!(err.code, "F001");
}

#[test]
fn unknown_bundle_fails() {
    let err = helpers::run("Nope", &helpers::empty_bag(), &CollectOptions::default()).unwrap_err();
    assert_eq!(err.code, "R000");
}

#[test]
fn predefined_document_requires_a_bundle_name() {
    let catalog = helpers::catalog();
    let directory = helpers::directory();
    let doc = helpers::predefined();
    let bag = helpers::empty_bag();
    let ctx = addinfo::CollectContext::new(&bag, &directory).with_predefined(&doc);
    let err = addinfo::collect(&catalog, "Basic", &ctx, &CollectOptions::default()).unwrap_err();
    assert_eq!(err.code, "C003");
}

#[test]
fn directory_filter_can_be_disabled() {
    let mut options = CollectOptions::default().with_customer("ACME");
    options.apply_directory_filter = false;
    let artifacts = helpers::run("Basic", &helpers::empty_bag(), &options).unwrap();
    // no directory: the static (empty) list is offered as-is
    let supplier = artifacts.form.field("NFH_Loop.Supplier").unwrap();
    assert!(helpers::option_values(supplier).is_empty());
}

#[test]
fn request_json_runs_the_whole_pipeline() {
    let json = format!(
        r#"{{
            "catalog": {catalog},
            "bundleId": "Basic",
            "bag": {{"DS": [{{"header": {{"Supplier": "VZ"}}}}]}},
            "directory": {directory},
            "predefined": {predefined},
            "options": {{"mode": "NEEDED", "predefinedBundleName": "Basic"}}
        }}"#,
        catalog = helpers::catalog_json(),
        directory = include_str!("fixtures/directory.json"),
        predefined = serde_json::to_string(helpers::predefined_xml()).unwrap(),
    );
    let request = CollectRequest::from_json(&json).unwrap();
    assert_eq!(request.options.mode, CollectMode::Needed);

    let artifacts = request.run().unwrap();
    // DS has a saved bean: its Supplier is known, only its contact is missing
    assert!(artifacts.form.field("NFH_DS.Supplier").is_none());
    let contact = artifacts.form.field("NFH_DS.Contact.Name").unwrap();
    assert_eq!(contact.role, FieldRole::Hidden);
    let ds = artifacts.form.section("DS").unwrap();
    assert_eq!(ds.fields.len(), 1);
    assert_eq!(artifacts.values.value("DS.Supplier"), Some("VZ"));
}

#[test]
fn malformed_request_json_is_a_parse_error() {
    let err = CollectRequest::from_json("{\"bundleId\": 3}").unwrap_err();
    assert_eq!(err.code, "P001");
    assert_eq!(err.phase, Phase::Parse);
}
