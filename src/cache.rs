// src/cache.rs
//! Mutex-guarded map from one key domain to actor handles.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::handle::ActorHandle;

/// Thread-safe `K -> ActorHandle` map. Every operation runs inside one
/// critical section, so operations on a single key are linearizable.
pub struct KeyedCache<K> {
    entries: Mutex<HashMap<K, ActorHandle>>,
}

impl<K> KeyedCache<K>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Copy of the stored handle, or the empty handle.
    pub fn get(&self, key: &K) -> ActorHandle {
        self.entries.lock().get(key).cloned().unwrap_or_default()
    }

    /// Store `handle` under `key`, releasing any previously stored share.
    pub fn put(&self, key: K, handle: ActorHandle) {
        // The lock guard is a temporary, so `previous` drops after unlock.
        let previous = self.entries.lock().insert(key, handle);
        if let Some(previous) = previous {
            tracing::trace!(?key, "replaced cached handle");
            drop(previous);
        }
    }

    /// Remove `key`; absent keys are ignored.
    pub fn erase(&self, key: &K) {
        let removed = self.entries.lock().remove(key);
        drop(removed);
    }

    /// Remove `key` only if it currently maps to `expected`.
    pub fn erase_if(&self, key: &K, expected: &ActorHandle) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            match entries.get(key) {
                Some(current) if current == expected => entries.remove(key),
                _ => None,
            }
        };
        removed.is_some()
    }

    /// Remove every entry, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.entries.lock());
        let count = drained.len();
        drop(drained);
        count
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of all entries.
    pub fn snapshot(&self) -> Vec<(K, ActorHandle)> {
        self.entries
            .lock()
            .iter()
            .map(|(k, h)| (*k, h.clone()))
            .collect()
    }
}

impl<K> Default for KeyedCache<K>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox;
    use crate::pid::ActorId;
    use proptest::prelude::*;

    fn handle(id: u64) -> ActorHandle {
        let (tx, _rx) = mailbox::channel();
        ActorHandle::new(ActorId::new(id), tx)
    }

    #[test]
    fn missing_key_yields_empty_handle() {
        let cache = KeyedCache::<u64>::new();
        assert!(!cache.get(&1).is_valid());
        cache.erase(&1);
        assert!(cache.is_empty());
    }

    #[test]
    fn overwrite_releases_previous_share() {
        let cache = KeyedCache::new();
        let h1 = handle(1);
        let h2 = handle(2);

        cache.put(5u64, h1.clone());
        assert_eq!(h1.strong_count(), 2);

        cache.put(5u64, h2.clone());
        assert_eq!(h1.strong_count(), 1);
        assert_eq!(h2.strong_count(), 2);
        assert_eq!(cache.get(&5), h2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_every_share() {
        let cache = KeyedCache::new();
        let handles: Vec<_> = (0..4).map(handle).collect();
        for (i, h) in handles.iter().enumerate() {
            cache.put(i as u64, h.clone());
        }
        assert_eq!(cache.clear(), 4);
        assert!(cache.is_empty());
        assert!(handles.iter().all(|h| h.strong_count() == 1));
    }

    proptest! {
        #[test]
        fn last_write_wins(ops in proptest::collection::vec((0u64..8, any::<bool>()), 0..64)) {
            let cache = KeyedCache::new();
            let mut model = std::collections::HashMap::new();
            for (i, (key, insert)) in ops.into_iter().enumerate() {
                if insert {
                    let h = handle(i as u64);
                    cache.put(key, h.clone());
                    model.insert(key, h);
                } else {
                    cache.erase(&key);
                    model.remove(&key);
                }
            }
            prop_assert_eq!(cache.len(), model.len());
            for key in 0u64..8 {
                let expected = model.get(&key).cloned().unwrap_or_default();
                prop_assert_eq!(cache.get(&key), expected);
            }
        }
    }
}
