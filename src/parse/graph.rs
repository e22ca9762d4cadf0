//! petgraph-based declaration graph: bundle → component → field.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::types::ServiceCatalog;
use crate::error::CollectError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclNode {
    Bundle(String),
    Component(String),
    Field(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    /// Bundle lists the component.
    Contains,
    /// Component declares the field as additional info.
    Info,
    /// Component declares the field as a summary field.
    Summary,
    /// Component's modifier declares the field as a summary field.
    ModifierSummary,
}

pub struct DeclarationGraph {
    pub graph: DiGraph<DeclNode, Declaration>,
    pub node_indices: HashMap<DeclNode, NodeIndex>,
}

impl DeclarationGraph {
    pub fn build(catalog: &ServiceCatalog) -> Result<Self, Vec<CollectError>> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut errors = Vec::new();

        // Add all nodes
        for field in &catalog.fields {
            let node = DeclNode::Field(field.id.clone());
            node_indices
                .entry(node.clone())
                .or_insert_with(|| graph.add_node(node));
        }
        for component in &catalog.components {
            let node = DeclNode::Component(component.id.clone());
            node_indices
                .entry(node.clone())
                .or_insert_with(|| graph.add_node(node));
        }
        for bundle in &catalog.bundles {
            let node = DeclNode::Bundle(bundle.id.clone());
            node_indices
                .entry(node.clone())
                .or_insert_with(|| graph.add_node(node));
        }

        // Bundle → component
        for bundle in &catalog.bundles {
            let from = node_indices[&DeclNode::Bundle(bundle.id.clone())];
            for component_id in &bundle.components {
                match node_indices.get(&DeclNode::Component(component_id.clone())) {
                    Some(&to) => {
                        graph.add_edge(from, to, Declaration::Contains);
                    }
                    None => errors.push(CollectError::parse(
                        "P002",
                        format!(
                            "Bundle '{}' references unknown component '{}'",
                            bundle.id, component_id
                        ),
                    )),
                }
            }
        }

        // Component → field
        for component in &catalog.components {
            let from = node_indices[&DeclNode::Component(component.id.clone())];
            let modifier_fields = component
                .modifier
                .iter()
                .flat_map(|m| m.summary_fields.iter().map(|f| (f, Declaration::ModifierSummary)));
            let declared = component
                .info_fields
                .iter()
                .map(|f| (f, Declaration::Info))
                .chain(component.summary_fields.iter().map(|f| (f, Declaration::Summary)))
                .chain(modifier_fields);

            for (field_id, kind) in declared {
                match node_indices.get(&DeclNode::Field(field_id.clone())) {
                    Some(&to) => {
                        graph.add_edge(from, to, kind);
                    }
                    None => errors.push(CollectError::parse(
                        "P002",
                        format!(
                            "Component '{}' references unknown field '{}'",
                            component.id, field_id
                        ),
                    )),
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DeclarationGraph { graph, node_indices })
    }

    /// Components declaring `field_id` as additional info, sorted by id.
    pub fn info_declarers(&self, field_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(&DeclNode::Field(field_id.to_string())) else {
            return vec![];
        };
        let declarers: BTreeSet<&str> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| *e.weight() == Declaration::Info)
            .filter_map(|e| match &self.graph[e.source()] {
                DeclNode::Component(id) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        declarers.into_iter().collect()
    }

    /// Field ids declared as additional info by more than one component, sorted.
    pub fn shared_info_fields(&self) -> Vec<&str> {
        let mut shared: Vec<&str> = self
            .graph
            .node_indices()
            .filter_map(|idx| match &self.graph[idx] {
                DeclNode::Field(id) if self.info_declarers(id).len() > 1 => Some(id.as_str()),
                _ => None,
            })
            .collect();
        shared.sort_unstable();
        shared
    }

    /// How many times `component_id` declares `field_id` as additional info.
    pub fn info_declaration_count(&self, component_id: &str, field_id: &str) -> usize {
        let from = self
            .node_indices
            .get(&DeclNode::Component(component_id.to_string()));
        let to = self.node_indices.get(&DeclNode::Field(field_id.to_string()));
        match (from, to) {
            (Some(&a), Some(&b)) => self
                .graph
                .edges_connecting(a, b)
                .filter(|e| *e.weight() == Declaration::Info)
                .count(),
            _ => 0,
        }
    }

    /// Bundles listing `component_id`, sorted.
    pub fn bundles_containing(&self, component_id: &str) -> Vec<&str> {
        let Some(&idx) = self
            .node_indices
            .get(&DeclNode::Component(component_id.to_string()))
        else {
            return vec![];
        };
        let bundles: BTreeSet<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .filter_map(|n| match &self.graph[n] {
                DeclNode::Bundle(id) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        bundles.into_iter().collect()
    }
}
