//! Per-record mutual exclusion for key-map read-modify-write.
//!
//! Operations on different object ids never contend. Entries are created
//! on demand and dropped once the last holder or waiter lets go, including
//! waiters whose acquire future is cancelled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    /// Holders plus queued waiters.
    users: usize,
}

#[derive(Default)]
pub struct RecordLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // The table holds no invariants a panicking holder could break.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for exclusive access to `object_id`.
    pub async fn acquire(&self, object_id: &str) -> RecordGuard<'_> {
        let (lease, mutex) = {
            let mut table = self.table();
            let slot = table.entry(object_id.to_string()).or_insert_with(|| Slot {
                mutex: Arc::default(),
                users: 0,
            });
            slot.users += 1;
            let lease = Lease {
                locks: self,
                object_id: object_id.to_string(),
            };
            (lease, slot.mutex.clone())
        };

        // Dropping this future while queued drops `lease`, which releases
        // the slot just like a completed guard would.
        let guard = mutex.lock_owned().await;
        RecordGuard {
            _guard: guard,
            _lease: lease,
        }
    }

    /// Number of object ids with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.table().len()
    }
}

/// One registered user of a slot. Unregisters on drop.
struct Lease<'a> {
    locks: &'a RecordLocks,
    object_id: String,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        if let Some(slot) = table.get_mut(&self.object_id) {
            slot.users -= 1;
            if slot.users == 0 {
                table.remove(&self.object_id);
            }
        }
    }
}

/// Exclusive access to one record until dropped.
pub struct RecordGuard<'a> {
    // Fields drop in order: the mutex is released before the lease can
    // remove the slot, so a fresh slot never coexists with a held one.
    _guard: OwnedMutexGuard<()>,
    _lease: Lease<'a>,
}
