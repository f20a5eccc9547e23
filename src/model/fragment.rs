//! Inputs handed over by the analysis and manual-entry collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::{Edge, GraphState, Label, Node, NodeId, NodeType};
use crate::Result;

/// Weight given to the edge from the statistics root to a characteristic
/// that the analysis left unattached.
pub const ROOT_LINK_WEIGHT: f64 = 1.0;

/// Seed map: initial value per action label.
pub type SeedMap = BTreeMap<Label, f64>;

/// One effort unit attributed to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub label: Label,
    pub weight: f64,
}

impl Seed {
    pub fn new(label: impl Into<Label>, weight: f64) -> Self {
        Self { label: label.into(), weight }
    }
}

/// One parent/child mapping proposed by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentLink {
    pub child: Label,
    pub parent: Label,
    pub weight: f64,
}

impl ParentLink {
    pub fn new(child: impl Into<Label>, parent: impl Into<Label>, weight: f64) -> Self {
        Self { child: child.into(), parent: parent.into(), weight }
    }
}

/// Entry duration: whole minutes, or legacy free text such as `"1h30m"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Minutes(f64),
    Text(String),
}

impl From<u32> for DurationInput { fn from(v: u32) -> Self { DurationInput::Minutes(v as f64) } }
impl From<i64> for DurationInput { fn from(v: i64) -> Self { DurationInput::Minutes(v as f64) } }
impl From<f64> for DurationInput { fn from(v: f64) -> Self { DurationInput::Minutes(v) } }
impl From<String> for DurationInput { fn from(v: String) -> Self { DurationInput::Text(v) } }
impl From<&str> for DurationInput { fn from(v: &str) -> Self { DurationInput::Text(v.to_owned()) } }

/// Structured result of analysing one journal entry.
///
/// `skills` map actions to skills, `characteristics` map skills to
/// characteristics. Every mapping is `child → parent` with a weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub actions: Vec<Seed>,
    #[serde(default)]
    pub skills: Vec<ParentLink>,
    #[serde(default)]
    pub characteristics: Vec<ParentLink>,
    #[serde(default)]
    pub duration: Option<DurationInput>,
}

impl AnalysisResult {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Seeds keyed by label. Repeated actions add up.
    pub fn seeds(&self) -> SeedMap {
        let mut seeds = SeedMap::new();
        for seed in &self.actions {
            *seeds.entry(seed.label.clone()).or_insert(0.0) += seed.weight;
        }
        seeds
    }

    /// Graph fragment describing the analysed hierarchy.
    ///
    /// Characteristics that no mapping places under a parent are attached
    /// to `root` with [`ROOT_LINK_WEIGHT`].
    pub fn to_fragment(&self, root: &Label) -> GraphState {
        fn add(fragment: &mut GraphState, label: &Label, node_type: NodeType) {
            if fragment.find_by_label(label).is_none() {
                let node = Node::new(label.clone(), node_type);
                fragment.nodes.insert(node.id.clone(), node);
            }
        }

        let mut fragment = GraphState::new();

        add(&mut fragment, root, NodeType::Untyped);
        for seed in &self.actions {
            add(&mut fragment, &seed.label, NodeType::Action);
        }
        for link in &self.skills {
            add(&mut fragment, &link.child, NodeType::Action);
            add(&mut fragment, &link.parent, NodeType::Skill);
        }
        for link in &self.characteristics {
            add(&mut fragment, &link.child, NodeType::Skill);
            add(&mut fragment, &link.parent, NodeType::Characteristic);
        }

        let links = self.skills.iter().chain(&self.characteristics);
        for link in links {
            let edge = Edge::new(
                NodeId::from_label(&link.parent),
                NodeId::from_label(&link.child),
                link.weight,
            );
            fragment.edges.insert(edge.id.clone(), edge);
        }

        let attached: Vec<Label> = self
            .characteristics
            .iter()
            .map(|l| l.parent.clone())
            .filter(|p| !self.skills.iter().chain(&self.characteristics).any(|l| l.child == *p))
            .filter(|p| p != root)
            .collect();
        for characteristic in attached {
            let edge = Edge::new(
                NodeId::from_label(root),
                NodeId::from_label(&characteristic),
                ROOT_LINK_WEIGHT,
            );
            fragment.edges.entry(edge.id.clone()).or_insert(edge);
        }

        fragment
    }
}
