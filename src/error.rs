//! Error types shared by the protocol layer and the domain clients.

use crate::protocol::transport::TransportError;
use crate::types::{Status, TransactionId};
use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, HederaError>;

/// A request could not be constructed from the given arguments.
///
/// Raised before any interaction with the network and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds the maximum size of {max} bytes (got {actual})")]
    TooLarge {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// The cause behind a failed network interaction.
#[derive(Error, Debug)]
pub enum OperationFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("transaction {transaction_id} finished with status {status}")]
    Rejected {
        transaction_id: TransactionId,
        status: Status,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The single error kind surfaced by every protocol operation.
#[derive(Error, Debug)]
pub enum HederaError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("{operation} failed: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: OperationFailure,
    },
}

impl HederaError {
    pub(crate) fn operation(operation: &'static str, source: impl Into<OperationFailure>) -> Self {
        Self::Operation {
            operation,
            source: source.into(),
        }
    }

    /// Name of the operation that failed, if the failure happened past validation.
    pub fn operation_name(&self) -> Option<&'static str> {
        match self {
            HederaError::Validation(_) => None,
            HederaError::Operation { operation, .. } => Some(operation),
        }
    }

    /// Status of the receipt when the failure is an in-band rejection raised
    /// through [`crate::protocol::TransactionResult::require_success`].
    pub fn rejection_status(&self) -> Option<Status> {
        match self {
            HederaError::Operation {
                source: OperationFailure::Rejected { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Empty { field: "name" };
        assert_eq!(err.to_string(), "name must not be empty");

        let err = ValidationError::TooLarge {
            field: "metadata",
            max: 100,
            actual: 120,
        };
        assert!(err.to_string().contains("maximum size of 100 bytes"));
    }

    #[test]
    fn test_operation_error_keeps_context() {
        let err = HederaError::operation(
            "TokenMint",
            TransportError::Unavailable("connection refused".to_string()),
        );
        assert_eq!(err.operation_name(), Some("TokenMint"));
        assert!(err.to_string().contains("TokenMint failed"));
        assert!(err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_is_not_an_operation() {
        let err: HederaError = ValidationError::Empty { field: "symbol" }.into();
        assert!(err.operation_name().is_none());
        assert!(err.rejection_status().is_none());
    }
}
