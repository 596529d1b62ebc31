use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use txmatch_types::TestRunId;

/// Per-run mutual exclusion for collections within one process.
///
/// Different runs never contend; two collections of the same run execute one
/// after the other.
#[derive(Debug, Default)]
pub struct RunLocks {
    locks: Mutex<HashMap<TestRunId, Arc<Mutex<()>>>>,
}

impl RunLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, run: &TestRunId) -> Arc<Mutex<()>> {
        // The map and the unit mutexes hold no invariants a panic could break.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(run.clone()).or_default())
    }

    /// Drop the map entry once no other caller holds or waits on it.
    fn release(&self, run: &TestRunId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only taken under the map lock, so the count cannot grow here.
        let holders = Arc::strong_count(&lock);
        drop(lock);
        if holders == 2 {
            locks.remove(run);
        }
    }

    /// Run `f` while holding the lock for `run`.
    pub fn with_lock<T>(&self, run: &TestRunId, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(run);
        let out = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(run, lock);
        out
    }

    /// Number of runs currently holding or waiting on a lock.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
