//! The module contains the error the engine can throw.
//!
//! Every failure falls in one of three buckets (see [`ErrorKind`]):
//!
//! - [`Validation`] malformed or semantically invalid input, raised before
//!   any write is attempted. [`InvalidAmount`] (a balance that no longer
//!   fits in `i64`) lands in the same bucket.
//! - [`NotFound`] the target of an edit/delete does not exist. A transfer
//!   whose pair is broken raises [`IncompleteTransfer`], which is classified
//!   as not-found but stays distinguishable.
//! - [`Database`] the storage layer failed. Propagated unmodified after the
//!   open unit of work has been rolled back.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`IncompleteTransfer`]: EngineError::IncompleteTransfer
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Incomplete transfer pair: {0}")]
    IncompleteTransfer(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid stored payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidAmount(_) => ErrorKind::Validation,
            Self::NotFound(_) | Self::IncompleteTransfer(_) => ErrorKind::NotFound,
            Self::Serialization(_) | Self::Database(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::IncompleteTransfer(a), Self::IncompleteTransfer(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_transfer_is_classified_as_not_found() {
        let err = EngineError::IncompleteTransfer("missing transfer_in leg".to_string());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_ne!(err, EngineError::NotFound("missing transfer_in leg".to_string()));
    }

    #[test]
    fn overflow_is_a_validation_failure() {
        let err = EngineError::InvalidAmount("balance overflow".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Invalid amount: balance overflow");
    }

    #[test]
    fn database_errors_are_storage() {
        let err = EngineError::from(DbErr::Custom("disk full".to_string()));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.to_string(), "Custom Error: disk full");
    }
}
