use thiserror::Error;

use stockmaster_core::DomainError;

/// Store-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Deterministic domain failure (validation, not-found, conflict, ...).
    /// No state was changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage failure during an atomic write sequence. The enclosing
    /// transaction rolled back; the caller may retry.
    #[error("transaction failure during {operation}: {message}")]
    Transaction {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn transaction(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Transaction {
            operation,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }
}
