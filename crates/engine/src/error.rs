//! The module contains the errors the engine can return.
//!
//! Every failure is recoverable at the caller: bad input never aborts the
//! process, it surfaces as the variant naming the violated invariant.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An id (transaction, card, invoice) does not resolve.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed input: bad amount, invalid day-of-month, installments < 1,
    /// a transaction flagged both recurring and installment, and similar.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A lifecycle rule was violated: closing a non-open invoice, settling a
    /// non-closed one, mutating a frozen aggregate.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A uniqueness rule was violated, e.g. a second invoice for the same
    /// card and period.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
