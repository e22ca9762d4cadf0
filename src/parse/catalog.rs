//! Catalog lookups and bundle resolution.

use super::types::*;
use crate::error::CollectError;

impl ServiceCatalog {
    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn component(&self, id: &str) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn bundle(&self, id: &str) -> Option<&BundleDef> {
        self.bundles.iter().find(|b| b.id == id)
    }

    /// Look up every component and info-field reference of a bundle.
    ///
    /// Any unknown reference fails the whole resolution.
    pub fn resolve_bundle(&self, bundle_id: &str) -> Result<ResolvedBundle<'_>, CollectError> {
        let def = self.bundle(bundle_id).ok_or_else(|| {
            CollectError::resolve("R000", format!("Unknown bundle '{}'", bundle_id), None)
        })?;

        let mut components = Vec::with_capacity(def.components.len());
        for component_id in &def.components {
            let component = self.component(component_id).ok_or_else(|| {
                CollectError::resolve(
                    "R001",
                    format!(
                        "Bundle '{}' references unknown component '{}'",
                        bundle_id, component_id
                    ),
                    Some(component_id.clone()),
                )
            })?;
            components.push(self.resolve_component(component)?);
        }

        Ok(ResolvedBundle { def, components })
    }

    pub fn resolve_component<'a>(
        &'a self,
        component: &'a ComponentDef,
    ) -> Result<ResolvedComponent<'a>, CollectError> {
        let info_fields = self.lookup_fields(component, &component.info_fields)?;
        Ok(ResolvedComponent {
            def: component,
            info_fields,
        })
    }

    pub fn lookup_fields<'a>(
        &'a self,
        component: &ComponentDef,
        ids: &[FieldId],
    ) -> Result<Vec<&'a FieldDef>, CollectError> {
        ids.iter()
            .map(|id| {
                self.field(id).ok_or_else(|| {
                    CollectError::resolve(
                        "R002",
                        format!(
                            "Component '{}' references unknown field '{}'",
                            component.id, id
                        ),
                        Some(component.id.clone()),
                    )
                })
            })
            .collect()
    }
}
