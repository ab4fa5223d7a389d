// src/lib.rs
//! Iris actor registry.
//!
//! Maps numeric actor ids and symbolic names to shared [`ActorHandle`]s, so a
//! transport can turn a remote reference into a local handle and application
//! code can find important actors by a stable name. The registry also counts
//! running actors and lets threads block until that count reaches zero or
//! one, which the [`Runtime`] uses for quiescence on shutdown.
//!
//! A registry is owned by exactly one [`Runtime`]; there is no global
//! instance, so independent runtimes can coexist in one process.

pub mod atom;
pub mod barrier;
pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
#[cfg(feature = "logging")]
pub mod logging;
pub mod mailbox;
pub mod pid;
pub mod registry;
pub mod runtime;

pub use atom::ActorName;
pub use config::RuntimeConfig;
pub use error::{IrisError, Result};
pub use handle::ActorHandle;
pub use mailbox::{ExitReason, Message};
pub use pid::ActorId;
pub use registry::{ActorRegistry, RegistryKey};
pub use runtime::{Runtime, SystemContext};
