//! Propagation engine — path-weighted cumulative averaging.
//!
//! Each seed climbs from its action node to every ancestor, breadth-first.
//! A visit at `(node, path_weight)` adds `seed × path_weight` to the node's
//! accumulator and counts one hit; the node's parents are then enqueued at
//! `path_weight × edge_weight`. The final value of a node is its
//! accumulator divided by its hit count, so fan-in paths and repeated seeds
//! average instead of adding up.
//!
//! ## Cycle guard
//!
//! Each queued visit carries the ids on its own path. A parent already on
//! the path is not enqueued, and a path stops climbing at
//! [`PropagationLimits::max_depth`] edges. A DAG within the depth limit is
//! unaffected: no simple path repeats a node, so every hit the unguarded
//! traversal would count is still counted.
//!
//! Simple paths through a dense cycle still grow factorially, so each seed
//! may also enqueue at most [`PropagationLimits::max_visits`] visits. Once
//! the budget is spent the seed's remaining paths are dropped and counted in
//! [`Propagation::visits_dropped`]. Total work is bounded by
//! `seeds × max_visits`.

use std::collections::{BTreeMap, VecDeque};

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::config::PropagationLimits;
use crate::model::{EdgeMap, Label, NodeId, NodeMap, SeedMap};

/// Raw propagated intensity per label.
pub type PropagatedValues = BTreeMap<Label, f64>;

/// Result of one propagation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Propagation {
    pub values: PropagatedValues,
    /// Total node visits across all seeds.
    pub visits: usize,
    /// Parent edges not followed because the parent was already on the path.
    pub back_edges_skipped: usize,
    /// Paths that stopped at the depth limit while parents remained.
    pub truncated_paths: usize,
    /// Visits not enqueued because their seed spent its visit budget.
    pub visits_dropped: usize,
}

impl Propagation {
    /// True when the cycle guard changed the traversal.
    pub fn was_guarded(&self) -> bool {
        self.back_edges_skipped > 0 || self.truncated_paths > 0 || self.visits_dropped > 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    hits: u32,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.hits += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.hits as f64
    }
}

struct Visit<'a> {
    id: &'a NodeId,
    path_weight: f64,
    path: SmallVec<[&'a NodeId; 8]>,
}

/// Propagate `seeds` through the graph with the default limits.
pub fn propagate(nodes: &NodeMap, edges: &EdgeMap, seeds: &SeedMap) -> PropagatedValues {
    propagate_with_limits(nodes, edges, seeds, &PropagationLimits::default()).values
}

/// Propagate `seeds` through the graph.
///
/// Seed labels are matched against node labels ignoring case and
/// whitespace. A seed with no matching node contributes to itself only.
pub fn propagate_with_limits(
    nodes: &NodeMap,
    edges: &EdgeMap,
    seeds: &SeedMap,
    limits: &PropagationLimits,
) -> Propagation {
    let mut run = Propagation::default();
    if seeds.is_empty() {
        return run;
    }

    let id_by_label: HashMap<&str, &NodeId> = nodes
        .values()
        .map(|n| (n.label.key(), &n.id))
        .collect();

    // child → [(parent, weight)]
    let mut parents_of: HashMap<&NodeId, SmallVec<[(&NodeId, f64); 4]>> = HashMap::new();
    for edge in edges.values() {
        parents_of
            .entry(&edge.target)
            .or_default()
            .push((&edge.source, edge.weight));
    }

    let label_of = |id: &NodeId| -> Label {
        nodes
            .get(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| Label::new(id.as_str()))
    };

    let mut acc: HashMap<Label, Accumulator> = HashMap::new();

    for (seed_label, &seed_value) in seeds {
        let Some(&start) = id_by_label.get(seed_label.key()) else {
            tracing::trace!(seed = %seed_label, "seed has no node, counting as isolated leaf");
            acc.entry(seed_label.clone()).or_default().add(seed_value);
            run.visits += 1;
            continue;
        };

        let mut queue = VecDeque::new();
        queue.push_back(Visit {
            id: start,
            path_weight: 1.0,
            path: SmallVec::from_elem(start, 1),
        });

        let mut enqueued = 1usize;
        let mut seed_visits = 0usize;
        while let Some(visit) = queue.pop_front() {
            acc.entry(label_of(visit.id))
                .or_default()
                .add(seed_value * visit.path_weight);
            seed_visits += 1;

            let Some(parents) = parents_of.get(visit.id) else {
                continue;
            };
            if visit.path.len() > limits.max_depth {
                run.truncated_paths += 1;
                continue;
            }
            for &(parent, weight) in parents {
                if visit.path.contains(&parent) {
                    run.back_edges_skipped += 1;
                    continue;
                }
                if enqueued >= limits.max_visits {
                    run.visits_dropped += 1;
                    continue;
                }
                enqueued += 1;
                let mut path = visit.path.clone();
                path.push(parent);
                queue.push_back(Visit {
                    id: parent,
                    path_weight: visit.path_weight * weight,
                    path,
                });
            }
        }

        tracing::trace!(seed = %seed_label, value = seed_value, visits = seed_visits, "propagated seed");
        run.visits += seed_visits;
    }

    if run.was_guarded() {
        tracing::warn!(
            back_edges_skipped = run.back_edges_skipped,
            truncated_paths = run.truncated_paths,
            visits_dropped = run.visits_dropped,
            max_depth = limits.max_depth,
            max_visits = limits.max_visits,
            "propagation cut short: graph contains a cycle or exceeds a limit",
        );
    }

    run.values = acc
        .into_iter()
        .map(|(label, a)| (label, a.mean()))
        .collect();
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphState, Node};
    use pretty_assertions::assert_eq;

    fn seeds(pairs: &[(&str, f64)]) -> SeedMap {
        pairs.iter().map(|(l, v)| (Label::new(*l), *v)).collect()
    }

    fn values(pairs: &[(&str, f64)]) -> PropagatedValues {
        pairs.iter().map(|(l, v)| (Label::new(*l), *v)).collect()
    }

    fn chain() -> GraphState {
        GraphState::new()
            .with_node(Node::untyped("Progression"))
            .with_node(Node::characteristic("Intellect"))
            .with_node(Node::action("Coding"))
            .with_link("Progression", "Intellect", 0.5)
            .with_link("Intellect", "Coding", 0.8)
    }

    #[test]
    fn test_single_path_decays_by_weight() {
        let g = chain();
        let out = propagate(&g.nodes, &g.edges, &seeds(&[("Coding", 1.0)]));
        assert_eq!(out.len(), 3);
        assert_eq!(out[&Label::new("Coding")], 1.0);
        assert_eq!(out[&Label::new("Intellect")], 0.8);
        assert!((out[&Label::new("Progression")] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_diamond_does_not_inflate() {
        let g = GraphState::new()
            .with_node(Node::action("A"))
            .with_node(Node::skill("B1"))
            .with_node(Node::skill("B2"))
            .with_node(Node::characteristic("C"))
            .with_link("C", "B1", 1.0)
            .with_link("C", "B2", 1.0)
            .with_link("B1", "A", 1.0)
            .with_link("B2", "A", 1.0);
        let run = propagate_with_limits(&g.nodes, &g.edges, &seeds(&[("A", 1.0)]), &PropagationLimits::default());
        assert_eq!(run.values, values(&[("A", 1.0), ("B1", 1.0), ("B2", 1.0), ("C", 1.0)]));
        // C is reached along both paths
        assert_eq!(run.visits, 5);
        assert!(!run.was_guarded());
    }

    #[test]
    fn test_fan_in_from_several_seeds_averages() {
        let g = GraphState::new()
            .with_node(Node::action("Running"))
            .with_node(Node::action("Lifting"))
            .with_node(Node::characteristic("Strength"))
            .with_link("Strength", "Running", 1.0)
            .with_link("Strength", "Lifting", 1.0);
        let out = propagate(&g.nodes, &g.edges, &seeds(&[("Running", 1.0), ("Lifting", 3.0)]));
        assert_eq!(out[&Label::new("Strength")], 2.0);
    }

    #[test]
    fn test_unequal_fan_in_weights() {
        // A under P by two routes with different decay
        let g = GraphState::new()
            .with_node(Node::action("A"))
            .with_node(Node::skill("X"))
            .with_node(Node::skill("Y"))
            .with_node(Node::characteristic("P"))
            .with_link("X", "A", 0.5)
            .with_link("Y", "A", 1.0)
            .with_link("P", "X", 1.0)
            .with_link("P", "Y", 0.5);
        let out = propagate(&g.nodes, &g.edges, &seeds(&[("A", 2.0)]));
        assert_eq!(out[&Label::new("X")], 1.0);
        assert_eq!(out[&Label::new("Y")], 2.0);
        // (2 × 0.5 × 1.0 + 2 × 1.0 × 0.5) / 2
        assert_eq!(out[&Label::new("P")], 1.0);
    }

    #[test]
    fn test_unknown_seed_is_isolated_leaf() {
        let g = chain();
        let out = propagate(&g.nodes, &g.edges, &seeds(&[("Juggling", 0.7)]));
        assert_eq!(out, values(&[("Juggling", 0.7)]));
    }

    #[test]
    fn test_seed_matches_label_ignoring_case() {
        let g = chain();
        let out = propagate(&g.nodes, &g.edges, &seeds(&[("  coding", 1.0)]));
        assert_eq!(out.len(), 3);
        assert_eq!(out.keys().next().map(Label::as_str), Some("Coding"));
    }

    #[test]
    fn test_empty_seeds_yield_empty_result() {
        let g = chain();
        assert!(propagate(&g.nodes, &g.edges, &SeedMap::new()).is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let g = GraphState::new()
            .with_node(Node::action("A"))
            .with_node(Node::skill("B"))
            .with_link("B", "A", 1.0)
            .with_link("A", "B", 1.0);
        let run = propagate_with_limits(&g.nodes, &g.edges, &seeds(&[("A", 1.0)]), &PropagationLimits::default());
        assert_eq!(run.values, values(&[("A", 1.0), ("B", 1.0)]));
        assert_eq!(run.back_edges_skipped, 1);
    }

    #[test]
    fn test_depth_limit_truncates() {
        let g = GraphState::new()
            .with_node(Node::action("L0"))
            .with_node(Node::skill("L1"))
            .with_node(Node::skill("L2"))
            .with_node(Node::skill("L3"))
            .with_link("L1", "L0", 1.0)
            .with_link("L2", "L1", 1.0)
            .with_link("L3", "L2", 1.0);
        let run = propagate_with_limits(
            &g.nodes,
            &g.edges,
            &seeds(&[("L0", 1.0)]),
            &PropagationLimits { max_depth: 2, ..Default::default() },
        );
        assert!(run.values.contains_key(&Label::new("L2")));
        assert!(!run.values.contains_key(&Label::new("L3")));
        assert_eq!(run.truncated_paths, 1);
    }

    /// Every node is a parent of every other node.
    fn complete_digraph(n: usize) -> GraphState {
        let labels: Vec<String> = (0..n).map(|i| format!("N{i}")).collect();
        let mut g = labels.iter().fold(GraphState::new(), |g, l| g.with_node(Node::skill(l.as_str())));
        for parent in &labels {
            for child in labels.iter().filter(|c| *c != parent) {
                g = g.with_link(parent.as_str(), child.as_str(), 0.5);
            }
        }
        g
    }

    #[test]
    fn test_visit_budget_bounds_dense_cycles() {
        let g = complete_digraph(11);
        let limits = PropagationLimits { max_visits: 500, ..Default::default() };
        let run = propagate_with_limits(&g.nodes, &g.edges, &seeds(&[("N0", 1.0)]), &limits);

        assert!(run.was_guarded());
        assert!(run.visits_dropped > 0);
        assert!(run.visits <= 500);
        assert_eq!(run.values[&Label::new("N0")], 1.0);
        // breadth-first order reaches every direct parent before the budget runs out
        assert_eq!(run.values.len(), 11);
    }

    #[test]
    fn test_default_budget_bounds_dense_cycles() {
        let g = complete_digraph(11);
        let run = propagate_with_limits(
            &g.nodes,
            &g.edges,
            &seeds(&[("N0", 1.0), ("N5", 1.0)]),
            &PropagationLimits::default(),
        );
        assert!(run.visits <= 2 * crate::config::DEFAULT_MAX_VISITS);
        assert!(run.visits_dropped > 0);
    }

    #[test]
    fn test_budget_leaves_small_dags_alone() {
        let g = chain();
        let limits = PropagationLimits { max_visits: 3, ..Default::default() };
        let run = propagate_with_limits(&g.nodes, &g.edges, &seeds(&[("Coding", 1.0)]), &limits);
        assert_eq!(run.visits, 3);
        assert!(!run.was_guarded());
    }

    #[test]
    fn test_dangling_parent_uses_id_as_label() {
        let g = GraphState::new()
            .with_node(Node::action("Coding"))
            .with_link("Craft", "Coding", 0.5);
        let out = propagate(&g.nodes, &g.edges, &seeds(&[("Coding", 1.0)]));
        assert_eq!(out[&Label::new("craft")], 0.5);
    }
}
