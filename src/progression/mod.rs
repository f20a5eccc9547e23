//! Progression orchestrator — the two entry points.
//!
//! ```text
//! seeds ──propagate──▶ raw intensity ──× multiplier──▶ node_increases ──apply──▶ next_stats
//! ```
//!
//! - **Scaled**: weighted seeds from analysis (or a duration-aware manual
//!   entry), scaled by the duration multiplier.
//! - **Direct**: every listed action seeded at a flat value, no scaling.
//!   Used for debug/admin injection.

use std::collections::BTreeMap;

use crate::config::ProgressionConfig;
use crate::formulas::{duration_multiplier, scale_experience};
use crate::model::{DurationInput, GraphState, Label, PlayerStatistics, SeedMap};
use crate::propagation::propagate_with_limits;
use crate::stats::{apply_deltas, LevelUp};
use crate::Result;

/// Flat seed value used by direct injection when none is given.
pub const DEFAULT_DIRECT_EXP: f64 = 1.0;

/// Everything one processed entry produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionOutcome {
    pub next_stats: PlayerStatistics,
    pub total_increase: f64,
    pub levels_gained: u32,
    pub level_ups: Vec<LevelUp>,
    /// Exact scaled delta per node, for audit and display.
    pub node_increases: BTreeMap<Label, f64>,
    /// Multiplier the increases were scaled by (1.0 for direct injection).
    pub multiplier: f64,
}

/// Runs the pipeline under a given configuration.
#[derive(Debug, Clone, Default)]
pub struct Progressor {
    config: ProgressionConfig,
}

impl Progressor {
    pub fn new(config: ProgressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Weighted seeds scaled by the entry's duration.
    pub fn scaled(
        &self,
        topology: &GraphState,
        stats: &PlayerStatistics,
        action_weights: &SeedMap,
        duration: Option<&DurationInput>,
    ) -> ProgressionOutcome {
        let multiplier = duration_multiplier(duration, self.config.minutes_per_unit);
        self.run(topology, stats, action_weights, multiplier)
    }

    /// Every action seeded at `exp`, unscaled. Repeated actions collapse
    /// into one seed.
    pub fn direct<I>(
        &self,
        topology: &GraphState,
        stats: &PlayerStatistics,
        actions: I,
        exp: f64,
    ) -> ProgressionOutcome
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        let seeds: SeedMap = actions.into_iter().map(|a| (a.into(), exp)).collect();
        self.run(topology, stats, &seeds, 1.0)
    }

    fn run(
        &self,
        topology: &GraphState,
        stats: &PlayerStatistics,
        seeds: &SeedMap,
        multiplier: f64,
    ) -> ProgressionOutcome {
        let propagation = propagate_with_limits(&topology.nodes, &topology.edges, seeds, &self.config.limits);
        let node_increases = scale_experience(&propagation.values, multiplier);
        let update = apply_deltas(stats, &node_increases);

        tracing::debug!(
            seeds = seeds.len(),
            nodes_touched = node_increases.len(),
            multiplier,
            total_increase = update.total_increase,
            levels_gained = update.levels_gained,
            "computed progression",
        );

        ProgressionOutcome {
            next_stats: update.next_stats,
            total_increase: update.total_increase,
            levels_gained: update.levels_gained,
            level_ups: update.level_ups,
            node_increases,
            multiplier,
        }
    }
}

/// [`Progressor::scaled`] under the default configuration.
pub fn calculate_scaled_progression(
    topology: &GraphState,
    stats: &PlayerStatistics,
    action_weights: &SeedMap,
    duration: Option<&DurationInput>,
) -> ProgressionOutcome {
    Progressor::default().scaled(topology, stats, action_weights, duration)
}

/// [`Progressor::direct`] under the default configuration.
pub fn calculate_direct_progression<I>(
    topology: &GraphState,
    stats: &PlayerStatistics,
    actions: I,
    exp: f64,
) -> ProgressionOutcome
where
    I: IntoIterator,
    I::Item: Into<Label>,
{
    Progressor::default().direct(topology, stats, actions, exp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use pretty_assertions::assert_eq;

    fn topology() -> GraphState {
        GraphState::new()
            .with_node(Node::untyped("Progression"))
            .with_node(Node::characteristic("Intellect"))
            .with_node(Node::action("Coding"))
            .with_link("Progression", "Intellect", 0.5)
            .with_link("Intellect", "Coding", 0.8)
    }

    fn increases(pairs: &[(&str, f64)]) -> BTreeMap<Label, f64> {
        pairs.iter().map(|(l, v)| (Label::new(*l), *v)).collect()
    }

    #[test]
    fn test_scaled_half_hour() {
        let stats = PlayerStatistics::new("progression");
        let weights: SeedMap = [(Label::new("Coding"), 1.0)].into_iter().collect();
        let out = calculate_scaled_progression(&topology(), &stats, &weights, Some(&DurationInput::Minutes(30.0)));

        assert_eq!(out.node_increases, increases(&[("Coding", 1.0), ("Intellect", 0.8), ("Progression", 0.4)]));
        assert_eq!(out.levels_gained, 1);
        assert_eq!(out.total_increase, 2.2);
        assert_eq!(out.multiplier, 1.0);
    }

    #[test]
    fn test_scaled_doubles_for_an_hour() {
        let stats = PlayerStatistics::new("Progression");
        let weights: SeedMap = [(Label::new("Coding"), 1.0)].into_iter().collect();
        let out = calculate_scaled_progression(&topology(), &stats, &weights, Some(&"1h".into()));
        assert_eq!(out.node_increases, increases(&[("Coding", 2.0), ("Intellect", 1.6), ("Progression", 0.8)]));
    }

    #[test]
    fn test_direct_ignores_duration_and_uses_flat_exp() {
        let stats = PlayerStatistics::new("Progression");
        let out = calculate_direct_progression(&topology(), &stats, ["Coding", "coding"], 3.0);
        assert_eq!(out.node_increases, increases(&[("Coding", 3.0), ("Intellect", 2.4), ("Progression", 1.2)]));
        assert_eq!(out.multiplier, 1.0);
        // coding 0 → 2, intellect 0 → 1, progression 0 → 1
        assert_eq!(out.levels_gained, 4);
    }

    #[test]
    fn test_custom_unit_length() {
        let config = ProgressionConfig { minutes_per_unit: 60.0, ..Default::default() };
        let progressor = Progressor::new(config).unwrap();
        let weights: SeedMap = [(Label::new("Coding"), 1.0)].into_iter().collect();
        let out = progressor.scaled(&topology(), &PlayerStatistics::new("Progression"), &weights, Some(&DurationInput::Minutes(30.0)));
        assert_eq!(out.multiplier, 0.5);
        assert_eq!(out.node_increases[&Label::new("Coding")], 0.5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProgressionConfig { minutes_per_unit: 0.0, ..Default::default() };
        assert!(Progressor::new(config).is_err());
    }
}
