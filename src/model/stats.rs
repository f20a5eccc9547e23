//! PlayerStatistics — per-label experience and level.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::Label;

/// Default label of the statistics root node.
pub const DEFAULT_ROOT_LABEL: &str = "Progression";

/// Experience and level of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeStats {
    pub experience: f64,
    pub level: u32,
}

/// Snapshot of the player's progression, keyed by label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerStatistics(BTreeMap<Label, NodeStats>);

impl PlayerStatistics {
    /// Fresh statistics holding only the root at `{0, 0}`.
    pub fn new(root: impl Into<Label>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(root.into(), NodeStats::default());
        Self(map)
    }

    pub fn get(&self, label: &Label) -> Option<&NodeStats> {
        self.0.get(label)
    }

    /// Stats for `label`, or `{0, 0}` when absent.
    pub fn get_or_default(&self, label: &Label) -> NodeStats {
        self.0.get(label).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &NodeStats)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_experience(&self) -> f64 {
        self.0.values().map(|s| s.experience).sum()
    }

    pub(crate) fn insert(&mut self, label: Label, stats: NodeStats) {
        self.0.insert(label, stats);
    }
}

impl FromIterator<(Label, NodeStats)> for PlayerStatistics {
    fn from_iter<T: IntoIterator<Item = (Label, NodeStats)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl NodeStats {
    pub fn at(experience: f64, level: u32) -> Self {
        Self { experience, level }
    }
}
