//! Per-request collection options.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CollectError;

/// Customer context used when none is configured.
pub const DEFAULT_CUSTOMER: &str = "DEFAULT";
/// Prefix of every generated form input name.
pub const DEFAULT_INPUT_PREFIX: &str = "NFH_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    /// Prompt for every declared field and attach occurrence controls.
    #[default]
    All,
    /// Prompt only for fields with no resolvable value.
    Needed,
}

impl FromStr for CollectMode {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(CollectMode::All),
            "needed" => Ok(CollectMode::Needed),
            other => Err(CollectError::parse(
                "C001",
                format!("Unknown collection mode '{}', expected 'all' or 'needed'", other),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for CollectMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for CollectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectMode::All => write!(f, "all"),
            CollectMode::Needed => write!(f, "needed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectOptions {
    pub mode: CollectMode,
    pub customer_id: String,
    /// Bundle name selected inside the predefined-bundle document.
    pub predefined_bundle_name: Option<String>,
    pub input_prefix: String,
    /// When false, Supplier/TradingPartnerName fields use their static options.
    pub apply_directory_filter: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            mode: CollectMode::All,
            customer_id: DEFAULT_CUSTOMER.to_string(),
            predefined_bundle_name: None,
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
            apply_directory_filter: true,
        }
    }
}

impl CollectOptions {
    pub fn from_json(json: &str) -> Result<Self, CollectError> {
        serde_json::from_str(json).map_err(|e| {
            CollectError::parse("C002", format!("Failed to parse collection options: {}", e))
        })
    }

    pub fn with_mode(mut self, mode: CollectMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = customer_id.into();
        self
    }

    pub fn with_predefined_bundle(mut self, name: impl Into<String>) -> Self {
        self.predefined_bundle_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("ALL".parse::<CollectMode>().unwrap(), CollectMode::All);
        assert_eq!(" Needed ".parse::<CollectMode>().unwrap(), CollectMode::Needed);
        let err = "some".parse::<CollectMode>().unwrap_err();
        assert_eq!(err.code, "C001");
    }

    #[test]
    fn options_fill_defaults() {
        let options = CollectOptions::from_json(r#"{"mode":"NEEDED"}"#).unwrap();
        assert_eq!(options.mode, CollectMode::Needed);
        assert_eq!(options.customer_id, "DEFAULT");
        assert_eq!(options.input_prefix, "NFH_");
        assert!(options.apply_directory_filter);
        assert!(options.predefined_bundle_name.is_none());
    }

    #[test]
    fn bad_mode_is_a_config_error() {
        let err = CollectOptions::from_json(r#"{"mode":"sometimes"}"#).unwrap_err();
        assert_eq!(err.code, "C002");
        assert!(err.message.contains("sometimes"));
    }
}
