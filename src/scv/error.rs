use crate::model::{CardKey, CardKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScvError {
    #[error("Card not found: {0}")]
    CardNotFound(CardKey),

    #[error("Failed to persist {operation}: {message}")]
    PersistenceWrite {
        operation: &'static str,
        message: String,
    },

    #[error("Payload of kind {payload} cannot be used for a {expected} card")]
    KindMismatch { expected: CardKind, payload: CardKind },

    #[error("No {0} ids left to allocate")]
    IdSpaceExhausted(CardKind),

    #[error("Invalid card reference: {0}")]
    InvalidCardKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl ScvError {
    pub fn persistence(operation: &'static str, err: impl std::fmt::Display) -> Self {
        ScvError::PersistenceWrite {
            operation,
            message: err.to_string(),
        }
    }

    /// True when the failure happened while writing to durable storage.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, ScvError::PersistenceWrite { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScvError>;
