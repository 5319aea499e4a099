//! Per-station admission locks
//!
//! Admission is count-then-insert. Two requests for the same station that
//! both count before either inserts could overbook it, so the whole
//! sequence runs under the station's mutex. Different stations never
//! contend.
//!
//! The guard is process-local; instances sharing a database are not
//! serialized against each other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct StationLocks {
    inner: Arc<DashMap<i32, Arc<Mutex<()>>>>,
}

impl StationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive admission rights on `station_id`.
    pub async fn acquire(&self, station_id: i32) -> OwnedMutexGuard<()> {
        let lock = self.inner.entry(station_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted station.
    pub fn forget(&self, station_id: i32) {
        self.inner.remove(&station_id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}
