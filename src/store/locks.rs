use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use crate::error::AppError;

/// One mutex per key, created on first use and dropped once nobody holds or
/// waits on it. Holders of different keys never contend with each other.
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T>(&self, key: &str, f: impl FnOnce() -> Result<T, AppError>) -> Result<T, AppError> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard: MutexGuard<'_, ()> = lock
                .lock()
                .map_err(|_| AppError::Internal(format!("lock for {key} is poisoned")))?;
            f()
        };

        // entries are only cloned under the shard lock, so a count of one
        // here means no other caller can be holding or waiting on it
        drop(lock);
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);

        outcome
    }
}
