//! Weighted parent → child edge.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Edge identifier, deterministic from the endpoints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{source}->{target}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed, weighted edge. `source` is the parent (more abstract),
/// `target` the child (more specific). `weight` is the share of the
/// child's contribution credited to this parent; it is never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, weight: f64) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
            weight,
        }
    }

    /// Same edge re-pointed at new endpoints, id re-derived.
    pub fn rewired(&self, source: NodeId, target: NodeId) -> Self {
        Self::new(source, target, self.weight)
    }
}
