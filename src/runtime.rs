// src/runtime.rs
//! The owning runtime: executor, registry and actor spawning.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::atom::ActorName;
use crate::config::RuntimeConfig;
use crate::error::{IrisError, Result};
use crate::handle::ActorHandle;
use crate::mailbox::{self, ExitReason, MailboxReceiver, Message};
use crate::pid::ActorId;
use crate::registry::ActorRegistry;

/// Identity of one runtime instance, shared with the components it owns.
#[derive(Debug)]
pub struct SystemContext {
    config: RuntimeConfig,
}

impl SystemContext {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Configured runtime name, used in log lines.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Releases an actor's running slot and id mapping however its task ends.
struct RunningGuard {
    registry: Arc<ActorRegistry>,
    handle: ActorHandle,
    reason: Option<ExitReason>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        // No recorded reason means the task was dropped before it finished.
        let reason = self.reason.take().unwrap_or(ExitReason::Killed);
        if let Some(id) = self.handle.id() {
            tracing::debug!(actor = %id, ?reason, "actor exited");
            // Leave the id alone if something else was put there since.
            self.registry.erase_handle(id, &self.handle);
        }
        self.handle.mark_exited(reason);
        self.registry.dec_running();
    }
}

/// Owns one executor and one registry. Dropping it shuts both down.
pub struct Runtime {
    system: Arc<SystemContext>,
    registry: Arc<ActorRegistry>,
    executor: Option<tokio::runtime::Runtime>,
    spawner: tokio::runtime::Handle,
    next_id: AtomicU64,
}

impl Runtime {
    /// Runtime with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Validate `config`, build the executor and start the registry.
    pub fn with_config(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let executor = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name(format!("{}-worker", config.name))
            .enable_all()
            .build()
            .map_err(IrisError::Executor)?;
        let spawner = executor.handle().clone();

        let system = Arc::new(SystemContext::new(config));
        let registry = Arc::new(ActorRegistry::new(system.clone()));
        registry.start();

        Ok(Self {
            system,
            registry,
            executor: Some(executor),
            spawner,
            // 0 is never handed out.
            next_id: AtomicU64::new(1),
        })
    }

    /// Identity and configuration of this runtime.
    pub fn system(&self) -> &Arc<SystemContext> {
        &self.system
    }

    /// The registry owned by this runtime.
    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    /// Spawn an actor running `body` over its mailbox.
    ///
    /// The actor is registered under its new id and counted as running until
    /// its future completes, panics, or is dropped at shutdown.
    pub fn spawn_actor<F, Fut>(&self, body: F) -> ActorHandle
    where
        F: FnOnce(MailboxReceiver) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = ActorId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = match self.system.config().mailbox_capacity {
            Some(capacity) => mailbox::bounded_channel(capacity),
            None => mailbox::channel(),
        };
        let handle = ActorHandle::new(id, tx);

        self.registry.put(id, handle.clone());
        self.registry.inc_running();
        let guard = RunningGuard {
            registry: self.registry.clone(),
            handle: handle.clone(),
            reason: None,
        };

        let actor = self.spawner.spawn(body(rx));
        self.spawner.spawn(async move {
            let mut guard = guard;
            guard.reason = Some(match actor.await {
                Ok(()) => ExitReason::Normal,
                Err(e) if e.is_panic() => ExitReason::Panic,
                Err(_) => ExitReason::Killed,
            });
        });

        tracing::debug!(system = %self.system.name(), actor = %id, "spawned actor");
        handle
    }

    /// Deliver `msg` to the actor registered under `id`.
    pub fn send(&self, id: ActorId, msg: Message) -> Result<()> {
        let handle = self.registry.get(id);
        if !handle.is_valid() {
            return Err(IrisError::UnknownId(id));
        }
        handle.send(msg)
    }

    /// Deliver `msg` to the actor registered under `name`.
    pub fn send_named(&self, name: ActorName, msg: Message) -> Result<()> {
        let handle = self.registry.get(name);
        if !handle.is_valid() {
            return Err(IrisError::UnknownName(name));
        }
        handle.send(msg)
    }

    /// Register `handle` under a well-known name, replacing any previous one.
    pub fn register(&self, name: ActorName, handle: ActorHandle) {
        self.registry.put(name, handle);
    }

    /// Drop the mapping for `name`, if any.
    pub fn unregister(&self, name: ActorName) {
        self.registry.erase(name);
    }

    /// Handle registered under `name`, or the empty handle.
    pub fn whereis(&self, name: ActorName) -> ActorHandle {
        self.registry.get(name)
    }

    /// Block the calling thread until no actor is running.
    ///
    /// Must not be called from inside an actor: it would wait on itself.
    pub fn await_idle(&self) {
        self.registry.await_running_count_equal(0);
    }

    /// Like [`Self::await_idle`], giving up after `timeout`.
    pub fn await_idle_timeout(&self, timeout: Duration) -> bool {
        self.registry.await_running_count_equal_timeout(0, timeout)
    }

    /// Stop the executor, then the registry. Also done on drop, including
    /// from inside an async context.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let Some(executor) = self.executor.take() else {
            return;
        };
        tracing::info!(
            system = %self.system.name(),
            running = self.registry.running(),
            "shutting down runtime"
        );
        if tokio::runtime::Handle::try_current().is_ok() {
            // Blocking is not allowed inside an async context. Actor tasks
            // are dropped in the background; their late exits are ignored by
            // the stopped registry.
            executor.shutdown_background();
        } else {
            // Dropping the remaining actor tasks releases their running slots
            // before the registry is drained.
            executor.shutdown_timeout(Duration::from_millis(
                self.system.config().shutdown_timeout_ms,
            ));
        }
        self.registry.stop();
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}
