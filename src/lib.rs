//! # progression-graph — Concept Graph Progression Engine
//!
//! Merges incremental fragments into a characteristic → skill → action
//! concept graph, and propagates experience seeded at actions up through
//! that graph into per-node scores and levels.
//!
//! ## Design Principles
//!
//! 1. **Pure core**: merge, propagation, formulas and the statistics
//!    mutator are total functions over immutable snapshots
//! 2. **One label rule**: `Label` is the only case/whitespace normalization
//! 3. **One rounding rule**: `formulas::round_to_precision` at every stage
//! 4. **Trait at the edge**: `SnapshotStore` is the contract with persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use progression_graph::{
//!     calculate_scaled_progression, DurationInput, GraphState, Label, Node,
//!     PlayerStatistics, SeedMap,
//! };
//!
//! let topology = GraphState::new()
//!     .with_node(Node::untyped("Progression"))
//!     .with_node(Node::characteristic("Intellect"))
//!     .with_node(Node::action("Coding"))
//!     .with_link("Progression", "Intellect", 0.5)
//!     .with_link("Intellect", "Coding", 0.8);
//!
//! let stats = PlayerStatistics::new("Progression");
//! let seeds: SeedMap = [(Label::new("Coding"), 1.0)].into_iter().collect();
//!
//! let out = calculate_scaled_progression(&topology, &stats, &seeds, Some(&DurationInput::Minutes(30.0)));
//! assert_eq!(out.node_increases[&Label::new("Intellect")], 0.8);
//! assert_eq!(out.levels_gained, 1);
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Merge | `merge` | Fold a fragment into the base graph |
//! | Propagate | `propagation` | Path-weighted cumulative averaging |
//! | Scale | `formulas` | Duration multiplier, rounding, level curve |
//! | Apply | `stats` | Positive deltas, level-up detection |
//! | Orchestrate | `progression` | Scaled and direct entry points |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod merge;
pub mod propagation;
pub mod formulas;
pub mod stats;
pub mod progression;
pub mod config;
pub mod store;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Label, Node, NodeId, NodeType, Edge, EdgeId, GraphState,
    PlayerStatistics, NodeStats, AnalysisResult, DurationInput, Seed, SeedMap,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use merge::{merge_fragment, merge_fragment_with_report, MergeReport};
pub use propagation::{propagate, propagate_with_limits, Propagation};
pub use stats::{apply_deltas, LevelUp, StatsUpdate};
pub use progression::{
    calculate_scaled_progression, calculate_direct_progression,
    ProgressionOutcome, Progressor, DEFAULT_DIRECT_EXP,
};
pub use config::{ProgressionConfig, PropagationLimits};

// ============================================================================
// Re-exports: Store
// ============================================================================

pub use store::{SnapshotStore, Snapshot, MemoryStore};

// ============================================================================
// Top-level Tracker handle
// ============================================================================

/// What recording one entry produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOutcome {
    /// The snapshot that was handed back to the store.
    pub snapshot: Snapshot,
    pub merge: MergeReport,
    pub progression: ProgressionOutcome,
}

/// The primary entry point. A `Tracker` wraps a snapshot store and runs
/// each entry through merge → propagate → apply → save.
pub struct Tracker<S: SnapshotStore> {
    store: S,
    progressor: Progressor,
}

impl<S: SnapshotStore> Tracker<S> {
    /// Create a Tracker with the default configuration.
    pub fn with_store(store: S) -> Self {
        Self { store, progressor: Progressor::default() }
    }

    pub fn with_config(store: S, config: ProgressionConfig) -> Result<Self> {
        Ok(Self { store, progressor: Progressor::new(config)? })
    }

    /// Current snapshot, or the initial one when nothing has been saved.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        match self.store.load().await {
            Ok(snapshot) => Ok(snapshot),
            Err(Error::NotFound(_)) => Ok(Snapshot::initial(&self.config().root_label)),
            Err(e) => Err(e),
        }
    }

    /// Record an analysed entry: merge its hierarchy, then award
    /// duration-scaled experience to its weighted actions.
    pub async fn record_analysis(&self, analysis: &AnalysisResult) -> Result<EntryOutcome> {
        // Phase 1: Load
        let current = self.snapshot().await?;

        // Phase 2: Merge
        let fragment = analysis.to_fragment(&self.config().root_label);
        let (topology, merge) = merge_fragment_with_report(&current.topology, &fragment);

        // Phase 3: Progress
        let progression = self.progressor.scaled(
            &topology,
            &current.statistics,
            &analysis.seeds(),
            analysis.duration.as_ref(),
        );

        // Phase 4: Save
        self.commit(topology, merge, progression).await
    }

    /// Record a manual entry: unweighted actions share one unit of effort
    /// equally, scaled by the optional duration. Unknown actions join the
    /// graph as unattached action nodes.
    pub async fn record_manual<I>(&self, actions: I, duration: Option<&DurationInput>) -> Result<EntryOutcome>
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        let labels: std::collections::BTreeSet<Label> = actions.into_iter().map(Into::into).collect();
        let share = 1.0 / labels.len().max(1) as f64;
        let seeds: SeedMap = labels.iter().map(|l| (l.clone(), share)).collect();

        let current = self.snapshot().await?;
        let fragment = labels
            .into_iter()
            .fold(GraphState::new(), |g, label| g.with_node(Node::action(label)));
        let (topology, merge) = merge_fragment_with_report(&current.topology, &fragment);
        let progression = self.progressor.scaled(&topology, &current.statistics, &seeds, duration);

        self.commit(topology, merge, progression).await
    }

    /// Debug/admin injection: every action seeded at a flat `exp`, no
    /// duration scaling, topology left unchanged.
    pub async fn inject<I>(&self, actions: I, exp: f64) -> Result<EntryOutcome>
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        let current = self.snapshot().await?;
        let progression = self.progressor.direct(&current.topology, &current.statistics, actions, exp);
        self.commit(current.topology, MergeReport::default(), progression).await
    }

    /// [`inject`](Self::inject) at [`DEFAULT_DIRECT_EXP`].
    pub async fn inject_default<I>(&self, actions: I) -> Result<EntryOutcome>
    where
        I: IntoIterator,
        I::Item: Into<Label>,
    {
        self.inject(actions, DEFAULT_DIRECT_EXP).await
    }

    async fn commit(
        &self,
        topology: GraphState,
        merge: MergeReport,
        progression: ProgressionOutcome,
    ) -> Result<EntryOutcome> {
        let snapshot = Snapshot {
            topology,
            statistics: progression.next_stats.clone(),
        };
        self.store.save(snapshot.clone()).await?;

        tracing::debug!(
            version = snapshot.topology.version,
            total_increase = progression.total_increase,
            levels_gained = progression.levels_gained,
            "recorded entry",
        );

        Ok(EntryOutcome { snapshot, merge, progression })
    }

    pub fn config(&self) -> &ProgressionConfig {
        self.progressor.config()
    }

    /// Access the underlying store (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// In-memory tracker for testing and embedding.
impl Tracker<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors from the shell around the pure core. Merge, propagation, the
/// formulas and the statistics mutator never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
