//! Predefined-bundle default document.
//!
//! Layout: `<Root><BundleName><ServiceComponents><ComponentId><Count value="1"/>
//! <FieldPath value="..."/>...` where field paths may nest further.

use crate::error::CollectError;
use crate::parse::xml::XmlNode;
use crate::resolve::path::PathExpr;

/// Element grouping the per-component defaults of one predefined bundle.
pub const SERVICE_COMPONENTS: &str = "ServiceComponents";
/// Per-component occurrence count element.
pub const COUNT: &str = "Count";

#[derive(Debug, Clone)]
pub struct PredefinedBundles {
    root: XmlNode,
}

impl PredefinedBundles {
    /// Parse the document. A malformed document is a configuration error.
    pub fn parse(xml: &str) -> Result<Self, CollectError> {
        let root = XmlNode::parse(xml).map_err(|e| {
            CollectError::parse("P003", format!("Malformed predefined-bundle document: {}", e))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    /// Value at `path` below the document element. Empty values count as absent.
    pub fn value(&self, path: &PathExpr) -> Option<&str> {
        self.root
            .find(path)
            .and_then(|n| n.value())
            .filter(|v| !v.is_empty())
    }

    /// Whether the bundle carries a defaults node for `component_id`.
    pub fn has_component(&self, bundle_name: &str, component_id: &str) -> bool {
        self.root
            .child(bundle_name, 0)
            .and_then(|b| b.child(SERVICE_COMPONENTS, 0))
            .and_then(|sc| sc.child(component_id, 0))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <PredefinedBundles>
          <LoopBundle>
            <ServiceComponents>
              <Loop>
                <Count value="2"/>
                <Supplier value="ATT"/>
              </Loop>
            </ServiceComponents>
          </LoopBundle>
        </PredefinedBundles>"#;

    #[test]
    fn reads_component_defaults() {
        let doc = PredefinedBundles::parse(DOC).unwrap();
        let path = PathExpr::compile("LoopBundle.ServiceComponents.Loop.Supplier").unwrap();
        assert_eq!(doc.value(&path), Some("ATT"));
        assert!(doc.has_component("LoopBundle", "Loop"));
        assert!(!doc.has_component("LoopBundle", "DS"));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = PredefinedBundles::parse("<PredefinedBundles><Loop>").unwrap_err();
        assert_eq!(err.code, "P003");
    }
}
