//! Per-plan mutual exclusion.
//!
//! Every mutating operation on a plan holds that plan's lock from the
//! moment it loads a document until the document is written back. Locks
//! for different slugs are independent. Entries are created on first use
//! and never removed, so a guard can never be handed out for a lock that
//! another caller has just discarded.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per plan slug, owned by a
/// [`Planner`](crate::Planner).
#[derive(Debug, Default)]
pub struct LockTable {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mutex for `slug`, creating it if needed.
    fn lock_for(&self, slug: &str) -> Arc<Mutex<()>> {
        // The map is only touched for lookups and inserts, so a poisoned
        // registry still holds consistent entries.
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(slug.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Waits for exclusive access to `slug`. Access is released when the
    /// returned guard is dropped.
    pub async fn acquire(&self, slug: &str) -> OwnedMutexGuard<()> {
        self.lock_for(slug).lock_owned().await
    }

    /// Number of slugs that have ever been locked through this table.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
