//! Trading-partner relationship directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("no trading-partner relationship configured for customer '{0}'")]
    NoRelationship(String),
    #[error("relationship directory unavailable: {0}")]
    Unavailable(String),
}

/// Enabled suppliers and trading partners per customer and component.
///
/// `Ok(None)` means the customer exists but has no list for the component.
pub trait TradingPartnerDirectory {
    fn enabled_trading_partners(
        &self,
        customer_id: &str,
        component_id: &str,
    ) -> Result<Option<Vec<String>>, DirectoryError>;

    fn enabled_gateway_suppliers(
        &self,
        customer_id: &str,
        component_id: &str,
    ) -> Result<Option<Vec<String>>, DirectoryError>;

    /// Display name of the supplier behind a trading partner.
    fn supplier_name(&self, customer_id: &str, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRelationships {
    #[serde(default)]
    pub trading_partners: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub gateway_suppliers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub supplier_names: BTreeMap<String, String>,
}

/// Directory held in memory, keyed by customer id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryDirectory {
    pub customers: BTreeMap<String, CustomerRelationships>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_mut(&mut self, customer_id: impl Into<String>) -> &mut CustomerRelationships {
        self.customers.entry(customer_id.into()).or_default()
    }

    fn customer(&self, customer_id: &str) -> Result<&CustomerRelationships, DirectoryError> {
        self.customers
            .get(customer_id)
            .ok_or_else(|| DirectoryError::NoRelationship(customer_id.to_string()))
    }
}

impl CustomerRelationships {
    pub fn with_trading_partners<I, S>(&mut self, component_id: &str, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trading_partners
            .insert(component_id.to_string(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_gateway_suppliers<I, S>(&mut self, component_id: &str, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gateway_suppliers
            .insert(component_id.to_string(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_supplier_name(&mut self, name: &str, display: &str) -> &mut Self {
        self.supplier_names.insert(name.to_string(), display.to_string());
        self
    }
}

impl TradingPartnerDirectory for MemoryDirectory {
    fn enabled_trading_partners(
        &self,
        customer_id: &str,
        component_id: &str,
    ) -> Result<Option<Vec<String>>, DirectoryError> {
        Ok(self.customer(customer_id)?.trading_partners.get(component_id).cloned())
    }

    fn enabled_gateway_suppliers(
        &self,
        customer_id: &str,
        component_id: &str,
    ) -> Result<Option<Vec<String>>, DirectoryError> {
        Ok(self.customer(customer_id)?.gateway_suppliers.get(component_id).cloned())
    }

    fn supplier_name(&self, customer_id: &str, name: &str) -> Option<String> {
        self.customers
            .get(customer_id)
            .and_then(|c| c.supplier_names.get(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_directory_lookups() {
        let mut dir = MemoryDirectory::new();
        dir.customer_mut("DEFAULT")
            .with_trading_partners("X", ["A", "B"])
            .with_supplier_name("A", "Alpha");

        assert_eq!(
            dir.enabled_trading_partners("DEFAULT", "X").unwrap(),
            Some(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(dir.enabled_gateway_suppliers("DEFAULT", "X").unwrap(), None);
        assert_eq!(dir.supplier_name("DEFAULT", "A").as_deref(), Some("Alpha"));
        assert_eq!(
            dir.enabled_trading_partners("ACME", "X").unwrap_err(),
            DirectoryError::NoRelationship("ACME".into())
        );
    }

    #[test]
    fn deserializes_from_json() {
        let dir: MemoryDirectory = serde_json::from_str(
            r#"{"DEFAULT": {"gatewaySuppliers": {"Loop": ["VZ", "ATT"]}}}"#,
        )
        .unwrap();
        assert_eq!(
            dir.enabled_gateway_suppliers("DEFAULT", "Loop").unwrap().unwrap().len(),
            2
        );
    }
}
