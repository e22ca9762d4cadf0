//! Summary-field values shown for each saved component occurrence.
//!
//! A summary field without an `XPath` custom value reads the bean header at
//! the field path. With one, the first value found in the bean body at that
//! path wins, falling back to the header when blank. Lookup failures are
//! logged and yield a blank value.

use serde::Serialize;

use crate::error::CollectError;
use crate::parse::types::{ComponentDef, FieldDef, ServiceCatalog};
use crate::parse::xml::XmlNode;
use crate::resolve::bag::ComponentBean;
use crate::resolve::path::PathCache;

/// Custom-value key holding the body path of a summary field.
pub const XPATH_KEY: &str = "XPath";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryValue {
    pub field_id: String,
    pub display_name: String,
    pub full_name: String,
    pub value: String,
}

pub struct SummaryReader<'c> {
    cache: &'c PathCache,
}

impl SummaryReader<'static> {
    pub fn new() -> Self {
        Self {
            cache: PathCache::global(),
        }
    }
}

impl Default for SummaryReader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> SummaryReader<'c> {
    pub fn with_cache(cache: &'c PathCache) -> Self {
        Self { cache }
    }

    pub fn summary_field_value(&self, component_type: &str, field: &FieldDef, bean: &ComponentBean) -> String {
        let header = || bean.header_value(&field.path).unwrap_or_default().to_string();

        let value = match field.custom_value(XPATH_KEY).filter(|x| !x.trim().is_empty()) {
            None => header(),
            Some(xpath) => match self.body_value(component_type, xpath, bean) {
                Ok(Some(v)) if !v.is_empty() => v,
                Ok(_) => header(),
                Err(message) => {
                    tracing::error!(
                        component_type,
                        field_id = %field.id,
                        error = %message,
                        "summary value lookup failed, using blank"
                    );
                    String::new()
                }
            },
        };

        tracing::debug!(component_type, field_id = %field.id, value = %value, "summary value");
        value
    }

    fn body_value(&self, component_type: &str, xpath: &str, bean: &ComponentBean) -> Result<Option<String>, String> {
        let path = self
            .cache
            .get_or_compile(component_type, xpath)
            .map_err(|e| e.to_string())?;
        let Some(body) = bean.body.as_deref() else {
            return Ok(None);
        };
        let root = XmlNode::parse(body).map_err(|e| e.to_string())?;

        // An absolute path names the root element first
        let segments = path.segments();
        let node = match segments.split_first() {
            Some((first, rest)) if first.name == root.name && first.index == 0 => {
                rest.iter().try_fold(&root, |node, s| node.child(&s.name, s.index))
            }
            _ => root.find(&path),
        };
        Ok(node.and_then(XmlNode::value).map(str::to_string))
    }

    /// Summary values of a component occurrence, in declaration order.
    pub fn summary_values(
        &self,
        catalog: &ServiceCatalog,
        component_id: &str,
        bean: &ComponentBean,
    ) -> Result<Vec<SummaryValue>, CollectError> {
        let component = lookup_component(catalog, component_id)?;
        let fields = catalog.lookup_fields(component, &component.summary_fields)?;
        Ok(self.values_of(component_id, &fields, bean))
    }

    /// Summary values declared by the component's modifier.
    pub fn modifier_summary_values(
        &self,
        catalog: &ServiceCatalog,
        component_id: &str,
        bean: &ComponentBean,
    ) -> Result<Vec<SummaryValue>, CollectError> {
        let component = lookup_component(catalog, component_id)?;
        let modifier = component.modifier.as_ref().ok_or_else(|| {
            CollectError::resolve(
                "M001",
                format!("Component '{}' has no modifier info", component_id),
                Some(component_id.to_string()),
            )
        })?;
        let fields = catalog.lookup_fields(component, &modifier.summary_fields)?;
        Ok(self.values_of(&modifier.id, &fields, bean))
    }

    fn values_of(&self, component_type: &str, fields: &[&FieldDef], bean: &ComponentBean) -> Vec<SummaryValue> {
        fields
            .iter()
            .map(|f| SummaryValue {
                field_id: f.id.clone(),
                display_name: f.display_name.clone(),
                full_name: f.full_name().to_string(),
                value: self.summary_field_value(component_type, f, bean),
            })
            .collect()
    }
}

fn lookup_component<'a>(catalog: &'a ServiceCatalog, component_id: &str) -> Result<&'a ComponentDef, CollectError> {
    catalog.component(component_id).ok_or_else(|| {
        CollectError::resolve(
            "R001",
            format!("Unknown component '{}'", component_id),
            Some(component_id.to_string()),
        )
    })
}
