//! GraphState — an immutable snapshot of the concept graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::{Edge, EdgeId, Label, Node, NodeId};

/// Node map keyed by id.
pub type NodeMap = BTreeMap<NodeId, Node>;

/// Edge map keyed by id.
pub type EdgeMap = BTreeMap<EdgeId, Edge>;

/// The whole concept graph at one point in time.
///
/// Ordered maps keep iteration (and therefore propagation and
/// serialization) deterministic. A snapshot is replaced wholesale on
/// merge, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    pub nodes: NodeMap,
    pub edges: EdgeMap,
    #[serde(default)]
    pub version: u64,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a node, replacing any node with the same id.
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    /// Builder: add a parent → child edge between two labels.
    pub fn with_link(mut self, parent: impl Into<Label>, child: impl Into<Label>, weight: f64) -> Self {
        let parent = NodeId::from_label(&parent.into());
        let child = NodeId::from_label(&child.into());
        let edge = Edge::new(parent, child, weight);
        self.edges.insert(edge.id.clone(), edge);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.insert(edge.id.clone(), edge);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Case/whitespace-insensitive lookup by label.
    pub fn find_by_label(&self, label: &Label) -> Option<&Node> {
        self.nodes.values().find(|n| n.label == *label)
    }

    /// Parents of `child` with the connecting edge weight.
    pub fn parents_of<'a>(&'a self, child: &'a NodeId) -> impl Iterator<Item = (&'a NodeId, f64)> + 'a {
        self.edges
            .values()
            .filter(move |e| e.target == *child)
            .map(|e| (&e.source, e.weight))
    }

    /// Children of `parent` with the connecting edge weight.
    pub fn children_of<'a>(&'a self, parent: &'a NodeId) -> impl Iterator<Item = (&'a NodeId, f64)> + 'a {
        self.edges
            .values()
            .filter(move |e| e.source == *parent)
            .map(|e| (&e.target, e.weight))
    }

    /// Nodes with no parent edge.
    pub fn roots(&self) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| !self.edges.values().any(|e| e.target == n.id))
            .collect()
    }

    /// Display label for an id, falling back to the id itself for edges
    /// that point outside the node map.
    pub fn label_of(&self, id: &NodeId) -> Label {
        self.nodes
            .get(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| Label::new(id.as_str()))
    }
}
