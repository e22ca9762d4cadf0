//! Schema types for bundle and component definitions.
//!
//! These types are the serde target for the service catalog JSON that the
//! configuration loader produces. Field definitions live once in the catalog
//! and are referenced by id from each component, which is what makes two
//! components share ("link") a field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable field-definition key. Components declaring the same id share the field.
pub type FieldId = String;

/// Path fragment identifying a supplier field.
pub const SUPPLIER: &str = "Supplier";
/// Path fragment identifying a trading-partner field.
pub const TRADING_PARTNER: &str = "TradingPartnerName";

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalog {
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub bundles: Vec<BundleDef>,
}

// =============================================================================
// FIELDS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub id: FieldId,
    /// Dotted XML path of the value, relative to the component node.
    pub path: String,
    pub display_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub custom_values: BTreeMap<String, String>,
}

impl FieldDef {
    pub fn full_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.display_name)
    }

    pub fn custom_value(&self, key: &str) -> Option<&str> {
        self.custom_values.get(key).map(|v| v.as_str())
    }

    pub fn party(&self) -> Party {
        Party::of(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataType {
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(default)]
        max_len: Option<u32>,
    },
    Enumerated {
        #[serde(default)]
        options: OptionSource,
    },
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Text { max_len: None }
    }
}

impl DataType {
    pub fn kind(&self) -> DataKind {
        match self {
            DataType::Text { .. } => DataKind::Text,
            DataType::Enumerated { .. } => DataKind::Enumerated,
        }
    }

    pub fn options(&self) -> Option<&OptionSource> {
        match self {
            DataType::Enumerated { options } => Some(options),
            DataType::Text { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataKind {
    Text,
    Enumerated,
}

/// Ordered list of allowed values for an enumerated field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSource {
    pub entries: Vec<OptionEntry>,
}

impl OptionSource {
    pub fn new(entries: Vec<OptionEntry>) -> Self {
        Self { entries }
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: values.into_iter().map(OptionEntry::value).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.value.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub value: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl OptionEntry {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: None,
            description: None,
        }
    }

    pub fn with_display(value: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: Some(display.into()),
            description: None,
        }
    }

    pub fn display(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.value)
    }
}

/// Which side of the Supplier/TradingPartnerName pair a field path denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Supplier,
    TradingPartner,
    None,
}

impl Party {
    /// Classify a field path. A path mentioning both names counts as a trading partner.
    pub fn of(path: &str) -> Party {
        if path.contains(TRADING_PARTNER) {
            Party::TradingPartner
        } else if path.contains(SUPPLIER) {
            Party::Supplier
        } else {
            Party::None
        }
    }

    pub fn is_party(self) -> bool {
        self != Party::None
    }
}

// =============================================================================
// COMPONENTS & BUNDLES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub min_occurs: u32,
    /// `None` means unbounded.
    #[serde(default)]
    pub max_occurs: Option<u32>,
    #[serde(default)]
    pub info_fields: Vec<FieldId>,
    #[serde(default)]
    pub summary_fields: Vec<FieldId>,
    #[serde(default)]
    pub modifier: Option<ModifierInfo>,
    #[serde(default)]
    pub default_message_type: Option<String>,
}

impl ComponentDef {
    pub fn full_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.display_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierInfo {
    pub id: String,
    #[serde(default)]
    pub summary_fields: Vec<FieldId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDef {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Component ids in declaration order.
    pub components: Vec<String>,
}

// =============================================================================
// RESOLVED VIEWS
// =============================================================================

/// A bundle with every component and field reference looked up in the catalog.
#[derive(Debug, Clone)]
pub struct ResolvedBundle<'a> {
    pub def: &'a BundleDef,
    pub components: Vec<ResolvedComponent<'a>>,
}

impl<'a> ResolvedBundle<'a> {
    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn component(&self, id: &str) -> Option<&ResolvedComponent<'a>> {
        self.components.iter().find(|c| c.def.id == id)
    }

    pub fn field(&self, field_id: &str) -> Option<&'a FieldDef> {
        self.components
            .iter()
            .flat_map(|c| c.info_fields.iter())
            .find(|f| f.id == field_id)
            .copied()
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedComponent<'a> {
    pub def: &'a ComponentDef,
    pub info_fields: Vec<&'a FieldDef>,
}

impl ResolvedComponent<'_> {
    pub fn id(&self) -> &str {
        &self.def.id
    }
}
