pub mod types;

use std::sync::Arc;

use parking_lot::RwLock;

pub use types::{Snapshot, SnapshotView, ViewError, format_timestamp, parse_timestamp};

/// Holds the currently published snapshot.
///
/// Publishing swaps an `Arc` under a short write lock; readers clone the
/// `Arc` and never see a partially built map. The previous snapshot is
/// freed once its last reader lets go. Concurrent publishes are serialized
/// by the lock: last publish wins.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    /// Create an empty (cold) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible snapshot and return the shared handle to it.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let prev = self.inner.write().replace(Arc::clone(&next));
        // drop the old one outside the lock
        drop(prev);
        next
    }

    /// Currently published snapshot, `None` before the first publish.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().clone()
    }

    pub fn is_cold(&self) -> bool {
        self.inner.read().is_none()
    }
}
