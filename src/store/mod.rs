//! # Snapshot Store Trait
//!
//! The hand-off point to the persistence collaborator. The engine never
//! persists anything itself: it loads one self-consistent [`Snapshot`],
//! computes the next one, and hands it back through [`SnapshotStore::save`].
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |
//!
//! Retries, timeouts and durability belong to implementations.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{GraphState, Label, Node, PlayerStatistics};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Snapshot
// ============================================================================

/// A topology and the statistics computed against it.
///
/// Always loaded and saved together so a computation never mixes a graph
/// with statistics from a different point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub topology: GraphState,
    pub statistics: PlayerStatistics,
}

impl Snapshot {
    /// Starting state: a graph holding only the root node and statistics
    /// holding only the root at `{0, 0}`.
    pub fn initial(root: &Label) -> Self {
        Self {
            topology: GraphState::new().with_node(Node::untyped(root.clone())),
            statistics: PlayerStatistics::new(root.clone()),
        }
    }
}

// ============================================================================
// SnapshotStore Trait
// ============================================================================

/// Where snapshots live between entries.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the current snapshot. `Error::NotFound` when nothing has been
    /// saved yet.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the current snapshot.
    async fn save(&self, snapshot: Snapshot) -> Result<()>;

    async fn load_topology(&self) -> Result<GraphState> {
        Ok(self.load().await?.topology)
    }

    async fn load_statistics(&self) -> Result<PlayerStatistics> {
        Ok(self.load().await?.statistics)
    }
}
