//! Node in the concept graph.

use serde::{Deserialize, Serialize};
use super::Label;

/// Stable node identifier, derived from a label's canonical key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn from_label(label: &Label) -> Self {
        Self(label.key().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(v: &str) -> Self { NodeId(v.to_owned()) }
}

/// Tier of a concept in the characteristic → skill → action hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Action,
    Skill,
    Characteristic,
    #[default]
    #[serde(rename = "none")]
    Untyped,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Action => write!(f, "action"),
            NodeType::Skill => write!(f, "skill"),
            NodeType::Characteristic => write!(f, "characteristic"),
            NodeType::Untyped => write!(f, "none"),
        }
    }
}

/// A node in the concept graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: Label,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
}

impl Node {
    /// Node whose id is derived from the label.
    pub fn new(label: impl Into<Label>, node_type: NodeType) -> Self {
        let label = label.into();
        Self {
            id: NodeId::from_label(&label),
            label,
            node_type,
        }
    }

    /// Node with an explicit id (fragments produced elsewhere may not
    /// follow the derivation rule).
    pub fn with_id(id: impl Into<NodeId>, label: impl Into<Label>, node_type: NodeType) -> Self {
        Self { id: id.into(), label: label.into(), node_type }
    }

    pub fn action(label: impl Into<Label>) -> Self {
        Self::new(label, NodeType::Action)
    }

    pub fn skill(label: impl Into<Label>) -> Self {
        Self::new(label, NodeType::Skill)
    }

    pub fn characteristic(label: impl Into<Label>) -> Self {
        Self::new(label, NodeType::Characteristic)
    }

    pub fn untyped(label: impl Into<Label>) -> Self {
        Self::new(label, NodeType::Untyped)
    }
}
