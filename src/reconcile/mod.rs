//! Reconcile phase: ResolvedBundle + existing data → Reconciliation.
//!
//! Walks every component's additional-info fields in declaration order,
//! applies the Supplier/TradingPartnerName rule, drops fields that already
//! have a value in `Needed` mode, and links fields shared by id across
//! components.

pub mod party;
pub mod registry;

use crate::config::{CollectMode, DEFAULT_INPUT_PREFIX};
use crate::error::CollectError;
use crate::ir::types::*;
use crate::parse::predefined::COUNT;
use crate::parse::types::{ResolvedBundle, ResolvedComponent, ServiceCatalog};
use crate::resolve::ExistingDataResolver;

use party::{PartyDecision, PartyState};
use registry::{FieldRegistry, Member};

/// Reconcile a resolved bundle with the default input prefix.
pub fn reconcile(
    bundle: &ResolvedBundle<'_>,
    resolver: &ExistingDataResolver<'_>,
    mode: CollectMode,
) -> Reconciliation {
    Reconciler::new(resolver, mode).reconcile(bundle)
}

/// Look up `bundle_id` in the catalog, then reconcile it. Unknown references fail the whole pass.
pub fn reconcile_bundle(
    catalog: &ServiceCatalog,
    bundle_id: &str,
    resolver: &ExistingDataResolver<'_>,
    mode: CollectMode,
) -> Result<Reconciliation, CollectError> {
    let bundle = catalog.resolve_bundle(bundle_id)?;
    Ok(reconcile(&bundle, resolver, mode))
}

pub struct Reconciler<'r> {
    resolver: &'r ExistingDataResolver<'r>,
    mode: CollectMode,
    input_prefix: String,
}

/// Working record for one field occurrence. `None` means accepted, settled from the registry.
struct Occurrence {
    field_id: String,
    reference: QualifiedRef,
    excluded: Option<Disposition>,
}

impl<'r> Reconciler<'r> {
    pub fn new(resolver: &'r ExistingDataResolver<'r>, mode: CollectMode) -> Self {
        Self {
            resolver,
            mode,
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
        }
    }

    pub fn with_input_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.input_prefix = prefix.into();
        self
    }

    pub fn reconcile(&self, bundle: &ResolvedBundle<'_>) -> Reconciliation {
        let mut registry = FieldRegistry::new();
        let mut components = Vec::new();
        let mut occurrences: Vec<Occurrence> = Vec::new();

        for component in &bundle.components {
            if let Some(prompt) = self.reconcile_component(component, &mut registry, &mut occurrences) {
                components.push(prompt);
            }
        }

        let dispositions = occurrences
            .into_iter()
            .map(|o| {
                let disposition = match o.excluded {
                    Some(d) => d,
                    None if registry.is_canonical(&o.field_id, &o.reference) => Disposition::Canonical,
                    None => Disposition::LinkMember,
                };
                FieldDisposition {
                    field_id: o.field_id,
                    reference: o.reference,
                    disposition,
                }
            })
            .collect();

        let link_groups = registry.link_groups();
        tracing::debug!(
            bundle_id = bundle.id(),
            mode = %self.mode,
            components = components.len(),
            link_groups = link_groups.len(),
            "bundle reconciled"
        );

        Reconciliation {
            bundle_id: bundle.id().to_string(),
            mode: self.mode,
            components,
            link_groups,
            dispositions,
        }
    }

    fn reconcile_component<'a>(
        &self,
        component: &ResolvedComponent<'a>,
        registry: &mut FieldRegistry<'a>,
        occurrences: &mut Vec<Occurrence>,
    ) -> Option<ComponentPrompt> {
        let component_id = component.id();
        let count = self.resolver.occurrence_count(component_id);
        let live = self.resolver.live_count(component_id);
        // saved data locks inputs in All mode only
        let read_only = self.mode == CollectMode::All && live > 0;

        if self.mode == CollectMode::Needed && count == 0 {
            tracing::debug!(component_id, "no occurrences, component skipped");
            return None;
        }

        let mut party = PartyState::new();
        let mut fields: Vec<PromptCandidate> = Vec::new();

        for field in component.info_fields.iter().copied() {
            let reference = QualifiedRef::new(component_id, field.path.as_str());
            let existing = self.resolver.resolve(component_id, &field.path);

            // 1. Needed mode only asks for what is still missing
            if self.mode == CollectMode::Needed && existing.is_some() {
                tracing::debug!(%reference, "value already present");
                occurrences.push(Occurrence {
                    field_id: field.id.clone(),
                    reference,
                    excluded: Some(Disposition::ExcludedByExistingValue),
                });
                continue;
            }

            // 2. Supplier/TradingPartnerName exclusion
            match party.admit(field.party(), &field.id, &reference) {
                PartyDecision::Accept => {}
                PartyDecision::Exclude => {
                    tracing::debug!(%reference, "supplier excluded by trading partner");
                    occurrences.push(Occurrence {
                        field_id: field.id.clone(),
                        reference,
                        excluded: Some(Disposition::ExcludedByPartyRule),
                    });
                    continue;
                }
                PartyDecision::Supersede(retracted) => {
                    for (field_id, retracted) in retracted {
                        tracing::debug!(%retracted, by = %reference, "supplier retracted");
                        registry.retract(&field_id, &retracted);
                        fields.retain(|f| f.reference != retracted);
                        if let Some(o) = occurrences.iter_mut().find(|o| o.reference == retracted) {
                            o.excluded = Some(Disposition::ExcludedByPartyRule);
                        }
                    }
                }
            }

            // 3. Register; a second occurrence of the same id links to the first
            let linked = registry.register(
                field,
                Member {
                    reference: reference.clone(),
                    existing: existing.clone(),
                    saved: read_only,
                },
            );
            if linked {
                tracing::debug!(%reference, field_id = %field.id, "linked to earlier occurrence");
            }

            occurrences.push(Occurrence {
                field_id: field.id.clone(),
                reference: reference.clone(),
                excluded: None,
            });
            fields.push(PromptCandidate {
                field_id: field.id.clone(),
                path: field.path.clone(),
                reference,
                kind: field.data_type.kind(),
                existing,
            });
        }

        let occurrence_control = match self.mode {
            CollectMode::All => Some(OccurrenceControl {
                input_name: format!("{}{}.{}", self.input_prefix, component_id, COUNT),
                current: count,
                min: component.def.min_occurs,
                max: component.def.max_occurs,
            }),
            CollectMode::Needed => None,
        };

        Some(ComponentPrompt {
            component_id: component_id.to_string(),
            display_name: component.def.display_name.clone(),
            full_name: component.def.full_name().to_string(),
            occurrences: count,
            live_occurrences: live,
            read_only,
            occurrence_control,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_catalog;
    use crate::resolve::{ComponentBean, MemoryBundleBag, PathCache};

    const CATALOG: &str = r#"{
        "fields": [
            {"id": "Supplier", "path": "Supplier", "displayName": "Supplier",
             "dataType": {"kind": "enumerated", "options": []}},
            {"id": "TP", "path": "TradingPartnerName", "displayName": "Trading Partner",
             "dataType": {"kind": "enumerated", "options": []}},
            {"id": "PON", "path": "PON", "displayName": "PON"},
            {"id": "InfoSupplier", "path": "Info.Supplier", "displayName": "Info Supplier",
             "dataType": {"kind": "enumerated", "options": []}}
        ],
        "components": [
            {"id": "Loop", "displayName": "Loop", "infoFields": ["Supplier", "PON"]},
            {"id": "DS", "displayName": "DS", "infoFields": ["Supplier"]},
            {"id": "X", "displayName": "X", "infoFields": ["Supplier", "TP"]},
            {"id": "Y", "displayName": "Y", "infoFields": ["Supplier", "InfoSupplier", "TP"]}
        ],
        "bundles": [
            {"id": "B", "components": ["Loop", "DS"]},
            {"id": "Mixed", "components": ["Loop", "X"]},
            {"id": "Dual", "components": ["Y"]}
        ]
    }"#;

    #[test]
    fn shared_field_links_once() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let bag = MemoryBundleBag::new();
        let cache = PathCache::new();
        let resolver = ExistingDataResolver::new(&bag).with_cache(&cache);
        let rec = reconcile_bundle(&catalog, "B", &resolver, CollectMode::All).unwrap();

        assert_eq!(rec.link_groups.len(), 1);
        assert_eq!(rec.link_groups[0].canonical_ref.to_string(), "Loop.Supplier");
        assert_eq!(
            rec.disposition(&QualifiedRef::new("DS", "Supplier")),
            Some(Disposition::LinkMember)
        );
        let control = rec.components[0].occurrence_control.as_ref().unwrap();
        assert_eq!(control.input_name, "NFH_Loop.Count");
    }

    #[test]
    fn trading_partner_retracts_linked_supplier() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let bag = MemoryBundleBag::new();
        let cache = PathCache::new();
        let resolver = ExistingDataResolver::new(&bag).with_cache(&cache);
        let rec = reconcile_bundle(&catalog, "Mixed", &resolver, CollectMode::All).unwrap();

        // X.Supplier joined Loop's group, then X's trading partner retracted it
        assert!(rec.link_groups.is_empty());
        assert_eq!(
            rec.disposition(&QualifiedRef::new("Loop", "Supplier")),
            Some(Disposition::Canonical)
        );
        assert_eq!(
            rec.disposition(&QualifiedRef::new("X", "Supplier")),
            Some(Disposition::ExcludedByPartyRule)
        );
        let x = rec.component("X").unwrap();
        assert_eq!(x.fields.len(), 1);
        assert_eq!(x.fields[0].path, "TradingPartnerName");
    }

    #[test]
    fn needed_mode_skips_resolved_fields_and_empty_components() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let mut bag = MemoryBundleBag::new();
        bag.add("Loop", ComponentBean::with_header([("Supplier", "ATT")]));
        let cache = PathCache::new();
        let resolver = ExistingDataResolver::new(&bag).with_cache(&cache);
        let rec = reconcile_bundle(&catalog, "B", &resolver, CollectMode::Needed).unwrap();

        assert_eq!(rec.components.len(), 1);
        let lp = &rec.components[0];
        assert!(lp.occurrence_control.is_none());
        assert_eq!(lp.fields.len(), 1);
        assert_eq!(lp.fields[0].path, "PON");
        assert_eq!(
            rec.disposition(&QualifiedRef::new("Loop", "Supplier")),
            Some(Disposition::ExcludedByExistingValue)
        );
        assert!(rec.disposition(&QualifiedRef::new("DS", "Supplier")).is_none());
    }

    #[test]
    fn trading_partner_retracts_every_supplier_of_the_component() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let bag = MemoryBundleBag::new();
        let cache = PathCache::new();
        let resolver = ExistingDataResolver::new(&bag).with_cache(&cache);
        let rec = reconcile_bundle(&catalog, "Dual", &resolver, CollectMode::All).unwrap();

        let y = rec.component("Y").unwrap();
        let paths: Vec<&str> = y.fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["TradingPartnerName"]);
        for path in ["Supplier", "Info.Supplier"] {
            assert_eq!(
                rec.disposition(&QualifiedRef::new("Y", path)),
                Some(Disposition::ExcludedByPartyRule)
            );
        }
        assert!(crate::ir::validate::validate_reconciliation(&rec).is_empty());
    }

    #[test]
    fn saved_data_does_not_lock_needed_mode() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let mut bag = MemoryBundleBag::new();
        bag.add("Loop", ComponentBean::with_header([("PON", "P-1")]));
        bag.add("DS", ComponentBean::default());
        let cache = PathCache::new();
        let resolver = ExistingDataResolver::new(&bag).with_cache(&cache);

        let needed = reconcile_bundle(&catalog, "B", &resolver, CollectMode::Needed).unwrap();
        assert!(needed.components.iter().all(|c| !c.read_only && c.has_saved_data()));
        assert!(!needed.link_group("Supplier").unwrap().value_locked);

        let all = reconcile_bundle(&catalog, "B", &resolver, CollectMode::All).unwrap();
        assert!(all.components.iter().all(|c| c.read_only));
        assert!(all.link_group("Supplier").unwrap().value_locked);
    }

    #[test]
    fn unknown_bundle_fails() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let bag = MemoryBundleBag::new();
        let resolver = ExistingDataResolver::new(&bag);
        let err = reconcile_bundle(&catalog, "Nope", &resolver, CollectMode::All).unwrap_err();
        assert_eq!(err.code, "R000");
    }
}
