use thiserror::Error;

/// The error taxonomy of the engine. Validation and state errors are raised before any write; gateway errors
/// during a refund are raised only after the failed attempt has been recorded in the order and the ledger.
#[derive(Debug, Clone, Error)]
pub enum PaymentEngineError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,
    #[error("Invalid state for this operation: {0}")]
    InvalidState(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Deliberately opaque: callers are not told whether the order was unknown or the signature was wrong.
    #[error("Payment verification failed")]
    VerificationFailed,
    #[error("Payment gateway error ({status_code}): {description}")]
    GatewayError { description: String, status_code: u16 },
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<sqlx::Error> for PaymentEngineError {
    fn from(e: sqlx::Error) -> Self {
        PaymentEngineError::DatabaseError(e.to_string())
    }
}

impl PaymentEngineError {
    pub fn not_found<S: std::fmt::Display>(what: S) -> Self {
        PaymentEngineError::NotFound(what.to_string())
    }

    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        PaymentEngineError::InvalidState(msg.into())
    }
}
