// src/config.rs
//! Runtime configuration, loadable from TOML.

use serde::Deserialize;
use std::path::Path;

use crate::error::{IrisError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Name of the runtime, attached to every registry log line.
    pub name: String,
    /// Executor worker threads.
    pub worker_threads: usize,
    /// Per-actor user mailbox bound. `None` means unbounded.
    pub mailbox_capacity: Option<usize>,
    /// How long shutdown waits for actors still being polled.
    pub shutdown_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: "iris".to_string(),
            worker_threads: num_cpus::get(),
            mailbox_capacity: None,
            shutdown_timeout_ms: 1000,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: RuntimeConfig = toml::de::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(IrisError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.mailbox_capacity == Some(0) {
            return Err(IrisError::InvalidConfig(
                "mailbox_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
