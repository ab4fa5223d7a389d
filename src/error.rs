// src/error.rs
use thiserror::Error;

use crate::atom::ActorName;
use crate::pid::ActorId;

#[derive(Error, Debug)]
pub enum IrisError {
    #[error("actor name `{name}` is longer than {max} characters")]
    NameTooLong { name: String, max: usize },

    #[error("actor name `{name}` contains invalid character {ch:?}")]
    InvalidNameChar { name: String, ch: char },

    #[error("failed to parse runtime configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read runtime configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build executor: {0}")]
    Executor(std::io::Error),

    #[error("no actor registered under id {0}")]
    UnknownId(ActorId),

    #[error("no actor registered under name `{0}`")]
    UnknownName(ActorName),

    #[error("message sent through an empty actor handle")]
    InvalidHandle,

    #[error("message to actor {0} could not be delivered")]
    Undeliverable(ActorId),
}

pub type Result<T> = std::result::Result<T, IrisError>;
