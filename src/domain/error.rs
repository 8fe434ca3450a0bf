//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::CardId;

/// Domain errors represent malformed input, not odd graph shapes.
/// Cycles, cross-links and sparse graphs are reported as data instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid card id: {0:?}")]
    InvalidCardId(String),

    #[error("unknown card type {kind:?} on card {id}")]
    UnknownCardKind { id: String, kind: String },

    #[error("unknown target handle: {0:?}")]
    UnknownHandle(String),

    #[error("duplicate card id: {0}")]
    DuplicateCardId(CardId),

    #[error("invalid heuristic {name}: {message}")]
    InvalidHeuristic { name: &'static str, message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
