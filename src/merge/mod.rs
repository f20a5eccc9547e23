//! Graph merge engine — folds a fragment into a base graph.
//!
//! Nodes are first-writer-wins by canonical label: a fragment node whose
//! label already exists (ignoring case and whitespace) is discarded and the
//! existing node kept. Edges are last-writer-wins by id, so a relationship's
//! weight can be refined entry after entry.
//!
//! A fragment node with a new label whose id is already held by a different
//! label is kept under a fresh id, and its fragment edges follow it.
//!
//! No cycle detection and no weight validation happen here.

use hashbrown::HashMap;

use crate::model::{GraphState, Label, NodeId};

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub nodes_added: usize,
    /// Fragment nodes dropped because the label was already taken.
    pub nodes_deduplicated: usize,
    pub edges_added: usize,
    /// Existing edges whose weight was overwritten with a different value.
    pub edges_updated: usize,
}

impl MergeReport {
    /// True when the merged graph equals the base.
    pub fn is_noop(&self) -> bool {
        self.nodes_added == 0 && self.edges_added == 0 && self.edges_updated == 0
    }
}

/// Merge `fragment` into `base`, returning a new graph.
pub fn merge_fragment(base: &GraphState, fragment: &GraphState) -> GraphState {
    merge_fragment_with_report(base, fragment).0
}

/// Merge and report what changed. `version` advances only when the graph
/// actually changed.
pub fn merge_fragment_with_report(base: &GraphState, fragment: &GraphState) -> (GraphState, MergeReport) {
    let mut merged = base.clone();
    let mut report = MergeReport::default();

    // canonical label key → id of the node that owns it
    let mut by_label: HashMap<String, NodeId> = merged
        .nodes
        .values()
        .map(|n| (n.label.key().to_owned(), n.id.clone()))
        .collect();
    // discarded fragment id → surviving id
    let mut redirect: HashMap<NodeId, NodeId> = HashMap::new();

    for node in fragment.nodes.values() {
        if let Some(existing) = by_label.get(node.label.key()) {
            if *existing != node.id {
                redirect.insert(node.id.clone(), existing.clone());
            }
            report.nodes_deduplicated += 1;
            continue;
        }
        let mut node = node.clone();
        if merged.nodes.contains_key(&node.id) {
            let id = fresh_id(&merged, &node.label);
            tracing::debug!(taken = %node.id, id = %id, label = %node.label, "node id held by another label, re-keying");
            redirect.insert(node.id.clone(), id.clone());
            node.id = id;
        }
        by_label.insert(node.label.key().to_owned(), node.id.clone());
        merged.nodes.insert(node.id.clone(), node);
        report.nodes_added += 1;
    }

    for edge in fragment.edges.values() {
        let source = redirect.get(&edge.source);
        let target = redirect.get(&edge.target);
        let edge = if source.is_some() || target.is_some() {
            edge.rewired(
                source.unwrap_or(&edge.source).clone(),
                target.unwrap_or(&edge.target).clone(),
            )
        } else {
            edge.clone()
        };

        match merged.edges.get(&edge.id) {
            Some(existing) if *existing == edge => {}
            Some(_) => {
                report.edges_updated += 1;
                merged.edges.insert(edge.id.clone(), edge);
            }
            None => {
                report.edges_added += 1;
                merged.edges.insert(edge.id.clone(), edge);
            }
        }
    }

    if !report.is_noop() {
        merged.version = base.version + 1;
    }

    tracing::debug!(
        nodes_added = report.nodes_added,
        nodes_deduplicated = report.nodes_deduplicated,
        edges_added = report.edges_added,
        edges_updated = report.edges_updated,
        version = merged.version,
        "merged fragment",
    );

    (merged, report)
}

/// First free id among the label key, then `key-2`, `key-3`, ...
fn fresh_id(graph: &GraphState, label: &Label) -> NodeId {
    let base = NodeId::from_label(label);
    let mut id = base.clone();
    let mut n = 1u64;
    while graph.nodes.contains_key(&id) {
        n += 1;
        id = NodeId(format!("{base}-{n}"));
    }
    id
}
