//! Engine configuration.
//!
//! Every field has a default, so `{}` is a valid config document.

use serde::{Deserialize, Serialize};

use crate::formulas::MINUTES_PER_UNIT;
use crate::model::{Label, DEFAULT_ROOT_LABEL};
use crate::{Error, Result};

/// Default depth at which a propagation path stops climbing.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of visits a single seed may enqueue.
pub const DEFAULT_MAX_VISITS: usize = 100_000;

/// Bounds on a single propagation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationLimits {
    /// Longest path (in edges) a seed may climb.
    pub max_depth: usize,
    /// Visits one seed may enqueue before the rest of its paths are dropped.
    pub max_visits: usize,
}

impl Default for PropagationLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_visits: DEFAULT_MAX_VISITS,
        }
    }
}

/// Configuration for a [`Progressor`](crate::progression::Progressor) and
/// a [`Tracker`](crate::Tracker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Minutes worth a duration multiplier of 1.0.
    pub minutes_per_unit: f64,
    /// Label of the statistics root.
    pub root_label: Label,
    pub limits: PropagationLimits,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            minutes_per_unit: MINUTES_PER_UNIT,
            root_label: Label::new(DEFAULT_ROOT_LABEL),
            limits: PropagationLimits::default(),
        }
    }
}

impl ProgressionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.minutes_per_unit.is_finite() || self.minutes_per_unit <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "minutes_per_unit must be a positive number, got {}",
                self.minutes_per_unit
            )));
        }
        if self.root_label.is_blank() {
            return Err(Error::InvalidConfig("root_label must not be blank".into()));
        }
        if self.limits.max_depth == 0 {
            return Err(Error::InvalidConfig("limits.max_depth must be at least 1".into()));
        }
        if self.limits.max_visits == 0 {
            return Err(Error::InvalidConfig("limits.max_visits must be at least 1".into()));
        }
        Ok(())
    }
}
