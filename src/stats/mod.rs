//! Statistics mutator — applies experience deltas and detects level-ups.
//!
//! This is the only place level-ups are detected. Call it once per
//! processed entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::formulas::{level_for_exp, round_to_precision};
use crate::model::{Label, NodeStats, PlayerStatistics};

/// One node crossing one or more level thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub label: Label,
    pub from: u32,
    pub to: u32,
}

impl LevelUp {
    pub fn gained(&self) -> u32 {
        self.to - self.from
    }
}

/// Outcome of [`apply_deltas`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsUpdate {
    pub next_stats: PlayerStatistics,
    pub total_increase: f64,
    pub levels_gained: u32,
    pub level_ups: Vec<LevelUp>,
}

/// Apply positive deltas to a copy of `current`.
///
/// Deltas `≤ 0`, NaN and infinite are skipped: experience never decreases
/// and skipped deltas do not count toward the totals. Stored experience
/// saturates at `f64::MAX`.
pub fn apply_deltas(current: &PlayerStatistics, deltas: &BTreeMap<Label, f64>) -> StatsUpdate {
    let mut next_stats = current.clone();
    let mut total_increase = 0.0;
    let mut levels_gained = 0u32;
    let mut level_ups = Vec::new();

    for (label, &delta) in deltas {
        if !delta.is_finite() || delta <= 0.0 {
            continue;
        }

        let before = current.get_or_default(label);
        let experience = round_to_precision(before.experience + delta).min(f64::MAX);
        let level = level_for_exp(experience);

        if level > before.level {
            levels_gained = levels_gained.saturating_add(level - before.level);
            level_ups.push(LevelUp { label: label.clone(), from: before.level, to: level });
        }

        // BTreeMap keeps the stored key, so an existing display form survives
        next_stats.insert(label.clone(), NodeStats { experience, level });
        total_increase += delta;
    }

    StatsUpdate {
        next_stats,
        total_increase: round_to_precision(total_increase).min(f64::MAX),
        levels_gained,
        level_ups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deltas(pairs: &[(&str, f64)]) -> BTreeMap<Label, f64> {
        pairs.iter().map(|(l, v)| (Label::new(*l), *v)).collect()
    }

    #[test]
    fn test_positive_delta_creates_entry() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("Coding", 1.0)]));
        assert_eq!(update.next_stats.get(&Label::new("Coding")), Some(&NodeStats::at(1.0, 1)));
        assert_eq!(update.total_increase, 1.0);
        assert_eq!(update.levels_gained, 1);
        assert_eq!(update.level_ups, vec![LevelUp { label: Label::new("Coding"), from: 0, to: 1 }]);
    }

    #[test]
    fn test_non_positive_deltas_are_ignored() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("Coding", 0.0), ("Reading", -2.0), ("Yoga", f64::NAN)]));
        assert_eq!(update.next_stats, stats);
        assert_eq!(update.total_increase, 0.0);
        assert_eq!(update.levels_gained, 0);
    }

    #[test]
    fn test_multi_level_jump_counts_every_level() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("Progression", 7.0)]));
        assert_eq!(update.levels_gained, 3);
        assert_eq!(update.level_ups[0].gained(), 3);
    }

    #[test]
    fn test_accumulates_on_existing_entry() {
        let stats: PlayerStatistics = [(Label::new("Coding"), NodeStats::at(2.5, 1))].into_iter().collect();
        let update = apply_deltas(&stats, &deltas(&[("coding", 0.50004)]));
        let coding = update.next_stats.get(&Label::new("Coding")).copied().unwrap();
        assert_eq!(coding, NodeStats::at(3.0, 2));
        assert_eq!(update.total_increase, 0.5);
        // stored display form survives a differently-cased delta
        assert_eq!(update.next_stats.iter().next().map(|(l, _)| l.as_str()), Some("Coding"));
    }

    #[test]
    fn test_input_snapshot_untouched() {
        let stats = PlayerStatistics::new("Progression");
        let _ = apply_deltas(&stats, &deltas(&[("Progression", 10.0)]));
        assert_eq!(stats, PlayerStatistics::new("Progression"));
    }

    #[test]
    fn test_huge_deltas_stay_finite() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("A", 1e305)]));
        assert_eq!(update.next_stats.get(&Label::new("A")), Some(&NodeStats::at(1e305, 1013)));

        let update = apply_deltas(&update.next_stats, &deltas(&[("A", f64::MAX)]));
        assert_eq!(update.next_stats.get(&Label::new("A")), Some(&NodeStats::at(f64::MAX, 1023)));
    }

    #[test]
    fn test_infinite_deltas_are_ignored() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("A", f64::INFINITY), ("B", f64::INFINITY)]));
        assert_eq!(update.next_stats, stats);
        assert_eq!(update.levels_gained, 0);
    }

    #[test]
    fn test_levels_gained_sums_large_jumps() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("A", f64::MAX), ("B", f64::MAX)]));
        assert_eq!(update.levels_gained, 2046);
        assert!(update.next_stats.iter().all(|(_, s)| s.experience.is_finite()));
        assert_eq!(update.total_increase, f64::MAX);
    }

    #[test]
    fn test_total_increase_is_rounded() {
        let stats = PlayerStatistics::new("Progression");
        let update = apply_deltas(&stats, &deltas(&[("A", 0.1), ("B", 0.2)]));
        assert_eq!(update.total_increase, 0.3);
    }
}
