// src/registry.rs
//! Actor registry: lookup of shared actor handles by id or by name.
//!
//! The registry does not hold every actor of a runtime, only the ones that
//! were put into it (the runtime registers spawned actors by id; transports
//! and application code add names as needed). Each key domain has its own
//! lock, and the running-actor barrier is a third, independent monitor.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::atom::ActorName;
use crate::barrier::RunningBarrier;
use crate::cache::KeyedCache;
use crate::handle::ActorHandle;
use crate::pid::ActorId;
use crate::runtime::SystemContext;

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::pid::ActorId {}
    impl Sealed for crate::atom::ActorName {}
}

/// Key types the registry accepts. Picks the cache for its domain at
/// compile time.
pub trait RegistryKey: sealed::Sealed + Copy + Eq + Hash + fmt::Debug + fmt::Display {
    #[doc(hidden)]
    fn cache(registry: &ActorRegistry) -> &KeyedCache<Self>;
}

impl RegistryKey for ActorId {
    fn cache(registry: &ActorRegistry) -> &KeyedCache<Self> {
        &registry.by_id
    }
}

impl RegistryKey for ActorName {
    fn cache(registry: &ActorRegistry) -> &KeyedCache<Self> {
        &registry.by_name
    }
}

const CREATED: u8 = 0;
const STARTED: u8 = 1;
const STOPPED: u8 = 2;

pub struct ActorRegistry {
    by_id: KeyedCache<ActorId>,
    by_name: KeyedCache<ActorName>,
    barrier: RunningBarrier,
    state: AtomicU8,
    system: Arc<SystemContext>,
}

impl ActorRegistry {
    pub(crate) fn new(system: Arc<SystemContext>) -> Self {
        Self {
            by_id: KeyedCache::new(),
            by_name: KeyedCache::new(),
            barrier: RunningBarrier::new(),
            state: AtomicU8::new(CREATED),
            system,
        }
    }

    /// Runtime this registry belongs to.
    pub fn system(&self) -> &SystemContext {
        &self.system
    }

    /// Handle stored under `key`, or the empty handle.
    pub fn get<K: RegistryKey>(&self, key: K) -> ActorHandle {
        K::cache(self).get(&key)
    }

    /// Associate `handle` with `key`, replacing (and releasing) any previous
    /// handle for that key.
    pub fn put<K: RegistryKey>(&self, key: K, handle: ActorHandle) {
        tracing::debug!(system = %self.system.name(), %key, actor = ?handle.id(), "registry put");
        K::cache(self).put(key, handle);
    }

    /// Drop the mapping for `key`, if any.
    pub fn erase<K: RegistryKey>(&self, key: K) {
        tracing::debug!(system = %self.system.name(), %key, "registry erase");
        K::cache(self).erase(&key);
    }

    /// Number of entries in the `K` domain.
    pub fn len<K: RegistryKey>(&self) -> usize {
        K::cache(self).len()
    }

    /// Snapshot of every name mapping.
    pub fn named_actors(&self) -> Vec<(ActorName, ActorHandle)> {
        self.by_name.snapshot()
    }

    /// Drop the mapping for `key` only if it still holds `handle`. Returns
    /// whether an entry was removed.
    pub fn erase_handle<K: RegistryKey>(&self, key: K, handle: &ActorHandle) -> bool {
        let removed = K::cache(self).erase_if(&key, handle);
        if removed {
            tracing::debug!(system = %self.system.name(), %key, "registry erase");
        }
        removed
    }

    /// Increase the running-actors count by one. Ignored after `stop`.
    pub fn inc_running(&self) {
        self.barrier.inc_running();
    }

    /// Decrease the running-actors count by one. Ignored after `stop`.
    pub fn dec_running(&self) {
        self.barrier.dec_running();
    }

    /// Number of currently running actors.
    pub fn running(&self) -> usize {
        self.barrier.running()
    }

    /// Block until the running-actors count equals `expected` (0 or 1).
    pub fn await_running_count_equal(&self, expected: usize) {
        self.barrier.await_running_count_equal(expected);
    }

    /// Like `await_running_count_equal`, giving up after `timeout`. Returns
    /// whether the count was reached.
    pub fn await_running_count_equal_timeout(&self, expected: usize, timeout: Duration) -> bool {
        self.barrier.await_running_count_equal_timeout(expected, timeout)
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STARTED
    }

    pub(crate) fn start(&self) {
        if self
            .state
            .compare_exchange(CREATED, STARTED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tracing::info!(system = %self.system.name(), "actor registry started");
        }
    }

    /// Empty both domains and close the running barrier. Terminal.
    pub(crate) fn stop(&self) {
        if self.state.swap(STOPPED, Ordering::SeqCst) == STOPPED {
            tracing::warn!(system = %self.system.name(), "actor registry stopped twice");
            return;
        }
        let ids = self.by_id.clear();
        let names = self.by_name.clear();
        self.barrier.close();
        tracing::info!(
            system = %self.system.name(),
            ids,
            names,
            "actor registry stopped"
        );
    }
}

impl fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRegistry")
            .field("system", &self.system.name())
            .field("ids", &self.by_id.len())
            .field("names", &self.by_name.len())
            .field("running", &self.running())
            .finish()
    }
}
