//! In-memory snapshot store.
//!
//! Reference implementation of `SnapshotStore`: one snapshot behind a
//! `parking_lot::RwLock`.
//!
//! ## Limitations
//!
//! - **No durability**: the snapshot is gone when the store is dropped.
//! - **Single-writer only**: `save()` replaces whatever is there. Two
//!   trackers racing on one store lose an entry; callers serialize entries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::Label;
use crate::{Error, Result};
use super::{Snapshot, SnapshotStore};

/// In-memory snapshot storage. Clones share the same snapshot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    snapshot: RwLock<Option<Snapshot>>,
    saves: AtomicU64,
}

impl MemoryStore {
    /// Store with nothing saved yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        *store.inner.snapshot.write() = Some(snapshot);
        store
    }

    /// Store pre-loaded with [`Snapshot::initial`].
    pub fn with_root(root: impl Into<Label>) -> Self {
        Self::with_snapshot(Snapshot::initial(&root.into()))
    }

    /// Number of successful `save()` calls.
    pub fn save_count(&self) -> u64 {
        self.inner.saves.load(Ordering::Relaxed)
    }

    /// Current snapshot without going through the async trait.
    pub fn peek(&self) -> Option<Snapshot> {
        self.inner.snapshot.read().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        self.inner
            .snapshot
            .read()
            .clone()
            .ok_or_else(|| Error::NotFound("no snapshot saved".into()))
    }

    async fn save(&self, snapshot: Snapshot) -> Result<()> {
        *self.inner.snapshot.write() = Some(snapshot);
        self.inner.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
