use thiserror::Error;

use crate::core::types::{EntityId, EntityName, SimTime};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Entity not found: {0}")]
    UnknownEntity(EntityId),

    #[error("Entity already registered: {0}")]
    DuplicateEntity(EntityId),

    #[error("Entity id was retired and cannot be registered again: {0}")]
    RetiredEntity(EntityId),

    #[error("Entity id space exhausted")]
    IdsExhausted,

    #[error("Entity handle is mutably borrowed")]
    HandleBorrowed,

    #[error("No entity named {0}")]
    UnknownName(EntityName),

    #[error("Entity name registered more than once: {0}")]
    DuplicateName(EntityName),

    #[error("Sender not registered: {0}")]
    UnknownSender(EntityId),

    #[error("Receiver not registered: {0}")]
    UnknownReceiver(EntityId),

    #[error("Receiver {0} is busy further up the call stack")]
    ReceiverBusy(EntityId),

    #[error("Invalid message delay: {0}")]
    InvalidDelay(f64),

    #[error("Clock cannot move backwards from {now} to {requested}")]
    ClockRegression { now: SimTime, requested: SimTime },

    #[error("State not registered in catalog: {0}")]
    StateNotRegistered(&'static str),

    #[error("Precondition failed for {entity}: {reason}")]
    Precondition { entity: EntityId, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EngineError {
    /// Build a behavior-layer precondition failure
    pub fn precondition(entity: EntityId, reason: impl Into<String>) -> Self {
        Self::Precondition {
            entity,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
