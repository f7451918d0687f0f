use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Hands out one mutex per add-on id so that mutations of the same id are serialized
/// while different ids proceed in parallel.
///
/// Entries are weak: a lock lives only while someone holds its handle, so ids that were
/// renamed, uninstalled or never existed do not accumulate.
#[derive(Default)]
pub struct LockTable {
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl LockTable {
    pub fn get(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(id).and_then(Weak::upgrade) {
            return lock;
        }

        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(id.to_owned(), Arc::downgrade(&lock));
        lock
    }

    /// Locks for several ids, ordered by id so that two callers never wait on each other.
    pub fn get_many(&self, ids: &[&str]) -> Vec<Arc<Mutex<()>>> {
        let mut sorted: Vec<&str> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.into_iter().map(|id| self.get(id)).collect()
    }

    /// Number of ids whose lock is currently held somewhere.
    pub fn live(&self) -> usize {
        self.locks
            .lock()
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }
}
