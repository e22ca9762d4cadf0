//! Filter phase: narrows enumerated option lists before assembly.
//!
//! Supplier and TradingPartnerName fields take their candidates from the
//! trading-partner directory for the component, intersected with the field's
//! static list when it has one. Any enumerated field left with exactly one
//! candidate collapses into the value document instead of being prompted.

pub mod directory;

use std::collections::{BTreeSet, HashMap};

use crate::error::CollectError;
use crate::ir::types::{Disposition, QualifiedRef, Reconciliation};
use crate::parse::types::{FieldDef, OptionEntry, OptionSource, Party, ResolvedBundle};

pub use directory::{CustomerRelationships, DirectoryError, MemoryDirectory, TradingPartnerDirectory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Prompt with these options.
    Options(OptionSource),
    /// Exactly one candidate: written to the value document, never prompted.
    Single(OptionEntry),
    /// No candidate in a multi-component bundle: the field is dropped.
    Omitted,
}

/// Filter outcomes for every canonical enumerated occurrence of a bundle.
#[derive(Debug, Clone, Default)]
pub struct FilteredOptions {
    outcomes: HashMap<QualifiedRef, FilterOutcome>,
}

impl FilteredOptions {
    pub fn get(&self, reference: &QualifiedRef) -> Option<&FilterOutcome> {
        self.outcomes.get(reference)
    }

    pub fn insert(&mut self, reference: QualifiedRef, outcome: FilterOutcome) {
        self.outcomes.insert(reference, outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

pub struct OptionFilter<'d> {
    directory: Option<&'d dyn TradingPartnerDirectory>,
    customer_id: String,
    single_component: bool,
}

impl<'d> OptionFilter<'d> {
    pub fn new(directory: &'d dyn TradingPartnerDirectory, customer_id: impl Into<String>) -> Self {
        Self {
            directory: Some(directory),
            customer_id: customer_id.into(),
            single_component: false,
        }
    }

    /// Static option lists only; party fields are not looked up.
    pub fn without_directory() -> Self {
        Self {
            directory: None,
            customer_id: String::new(),
            single_component: false,
        }
    }

    /// Zero candidates are fatal when the bundle holds a single component.
    pub fn for_bundle_size(mut self, component_count: usize) -> Self {
        self.single_component = component_count == 1;
        self
    }

    /// Filter every canonical enumerated occurrence of a reconciliation.
    ///
    /// An omitted canonical occurrence leaves its link group, and the member
    /// promoted in its place is filtered against its own component when the
    /// walk reaches it.
    pub fn apply(
        &self,
        rec: &mut Reconciliation,
        bundle: &ResolvedBundle<'_>,
    ) -> Result<FilteredOptions, CollectError> {
        let occurrences: Vec<(String, String, QualifiedRef)> = rec
            .components
            .iter()
            .flat_map(|c| {
                c.fields
                    .iter()
                    .map(|f| (c.component_id.clone(), f.field_id.clone(), f.reference.clone()))
            })
            .collect();

        let mut filtered = FilteredOptions::default();
        for (component_id, field_id, reference) in occurrences {
            if rec.disposition(&reference) != Some(Disposition::Canonical) {
                continue;
            }
            let Some(field) = bundle.field(&field_id) else {
                continue;
            };
            let Some(raw) = field.data_type.options() else {
                continue;
            };
            let outcome = self.filter_options(&component_id, field, raw)?;
            if outcome == FilterOutcome::Omitted {
                if let Some(promoted) = rec.omit(&reference) {
                    tracing::debug!(%reference, %promoted, "link group canonical promoted");
                }
            }
            filtered.insert(reference, outcome);
        }
        Ok(filtered)
    }

    pub fn filter_options(
        &self,
        component_id: &str,
        field: &FieldDef,
        raw: &OptionSource,
    ) -> Result<FilterOutcome, CollectError> {
        let party = field.party();
        let Some(directory) = self.directory.filter(|_| party.is_party()) else {
            return Ok(collapse(raw.clone()));
        };

        let lookup = match party {
            Party::TradingPartner => directory.enabled_trading_partners(&self.customer_id, component_id),
            _ => directory.enabled_gateway_suppliers(&self.customer_id, component_id),
        };
        let names = lookup
            .map_err(|e| CollectError::filter("F001", e.to_string(), Some(component_id.to_string())))?
            .ok_or_else(|| {
                CollectError::filter(
                    "F001",
                    format!(
                        "No {} list configured for customer '{}'",
                        field.path, self.customer_id
                    ),
                    Some(component_id.to_string()),
                )
            })?;
        let names: BTreeSet<String> = names.into_iter().filter(|n| !n.is_empty()).collect();

        if names.is_empty() {
            if self.single_component {
                return Err(CollectError::filter(
                    "F002",
                    format!(
                        "No {} enabled for customer '{}'; no transaction is possible",
                        field.path, self.customer_id
                    ),
                    Some(component_id.to_string()),
                ));
            }
            tracing::warn!(component_id, field = %field.id, "no directory candidates, field omitted");
            return Ok(FilterOutcome::Omitted);
        }

        let entries: Vec<OptionEntry> = names
            .iter()
            .filter(|n| raw.is_empty() || raw.contains(n))
            .map(|n| self.directory_entry(directory, party, n))
            .collect();

        if entries.is_empty() {
            return Err(CollectError::filter(
                "F003",
                format!(
                    "None of the enabled values for '{}' appear in its configured options",
                    field.id
                ),
                Some(component_id.to_string()),
            ));
        }

        tracing::debug!(component_id, field = %field.id, candidates = entries.len(), "options filtered");
        Ok(collapse(OptionSource::new(entries)))
    }

    fn directory_entry(
        &self,
        directory: &dyn TradingPartnerDirectory,
        party: Party,
        name: &str,
    ) -> OptionEntry {
        match party {
            Party::TradingPartner => {
                let supplier = directory
                    .supplier_name(&self.customer_id, name)
                    .unwrap_or_else(|| name.to_string());
                OptionEntry::with_display(name, format!("{} ({})", supplier, name))
            }
            _ => OptionEntry::value(name),
        }
    }
}

fn collapse(options: OptionSource) -> FilterOutcome {
    match <[OptionEntry; 1]>::try_from(options.entries) {
        Ok([only]) => FilterOutcome::Single(only),
        Err(entries) => FilterOutcome::Options(OptionSource::new(entries)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::DataType;

    fn enumerated(id: &str, path: &str, values: &[&str]) -> FieldDef {
        FieldDef {
            id: id.into(),
            path: path.into(),
            display_name: id.into(),
            full_name: None,
            data_type: DataType::Enumerated {
                options: OptionSource::from_values(values.iter().copied()),
            },
            custom_values: Default::default(),
        }
    }

    fn directory() -> MemoryDirectory {
        let mut dir = MemoryDirectory::new();
        dir.customer_mut("DEFAULT")
            .with_trading_partners("X", ["B", "A", "A"])
            .with_trading_partners("Solo", ["A"])
            .with_trading_partners("None", Vec::<String>::new())
            .with_gateway_suppliers("Loop", ["VZ", "ATT"])
            .with_supplier_name("A", "Alpha");
        dir
    }

    fn options(outcome: FilterOutcome) -> Vec<(String, String)> {
        match outcome {
            FilterOutcome::Options(os) => os
                .entries
                .iter()
                .map(|e| (e.value.clone(), e.display().to_string()))
                .collect(),
            other => panic!("expected options, got {:?}", other),
        }
    }

    #[test]
    fn trading_partners_sorted_with_supplier_display() {
        let dir = directory();
        let filter = OptionFilter::new(&dir, "DEFAULT");
        let field = enumerated("TP", "TradingPartnerName", &[]);
        let raw = field.data_type.options().unwrap();
        let result = options(filter.filter_options("X", &field, raw).unwrap());
        assert_eq!(
            result,
            vec![
                ("A".to_string(), "Alpha (A)".to_string()),
                ("B".to_string(), "B (B)".to_string())
            ]
        );
    }

    #[test]
    fn static_list_intersects() {
        let dir = directory();
        let filter = OptionFilter::new(&dir, "DEFAULT");
        let field = enumerated("Supplier", "Supplier", &["ATT", "QWEST"]);
        let raw = field.data_type.options().unwrap();
        assert_eq!(
            filter.filter_options("Loop", &field, raw).unwrap(),
            FilterOutcome::Single(OptionEntry::value("ATT"))
        );

        let disjoint = enumerated("Supplier", "Supplier", &["QWEST"]);
        let raw = disjoint.data_type.options().unwrap();
        let err = filter.filter_options("Loop", &disjoint, raw).unwrap_err();
        assert_eq!(err.code, "F003");
    }

    #[test]
    fn zero_candidates_depends_on_bundle_size() {
        let dir = directory();
        let field = enumerated("TP", "TradingPartnerName", &[]);
        let raw = field.data_type.options().unwrap();

        let multi = OptionFilter::new(&dir, "DEFAULT").for_bundle_size(2);
        assert_eq!(multi.filter_options("None", &field, raw).unwrap(), FilterOutcome::Omitted);

        let single = OptionFilter::new(&dir, "DEFAULT").for_bundle_size(1);
        assert_eq!(single.filter_options("None", &field, raw).unwrap_err().code, "F002");
    }

    #[test]
    fn missing_relationship_is_fatal() {
        let dir = directory();
        let field = enumerated("TP", "TradingPartnerName", &[]);
        let raw = field.data_type.options().unwrap();

        let unknown_customer = OptionFilter::new(&dir, "ACME");
        assert_eq!(unknown_customer.filter_options("X", &field, raw).unwrap_err().code, "F001");

        let filter = OptionFilter::new(&dir, "DEFAULT");
        assert_eq!(filter.filter_options("DS", &field, raw).unwrap_err().code, "F001");
    }

    #[test]
    fn static_fields_collapse_without_directory() {
        let filter = OptionFilter::without_directory();
        let speed = enumerated("Speed", "Speed", &["DS1"]);
        assert_eq!(
            filter
                .filter_options("Loop", &speed, speed.data_type.options().unwrap())
                .unwrap(),
            FilterOutcome::Single(OptionEntry::value("DS1"))
        );
        let supplier = enumerated("Supplier", "Supplier", &["VZ", "ATT"]);
        let result = options(
            filter
                .filter_options("Loop", &supplier, supplier.data_type.options().unwrap())
                .unwrap(),
        );
        assert_eq!(result.len(), 2);
    }
}
