//! Shared error type across vitalproxy crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed or mistyped input, rejected before any I/O.
    ValidationError,
    /// Scorer unreachable, timed out, or answered non-2xx.
    ScoringUnavailable,
    /// Unexpected fault inside the gateway.
    InternalFault,
    /// Metrics write with no active backing store.
    StoreUnavailable,
    /// Invalid configuration.
    BadConfig,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::ValidationError => "VALIDATION_ERROR",
            ClientCode::ScoringUnavailable => "SCORING_UNAVAILABLE",
            ClientCode::InternalFault => "INTERNAL_FAULT",
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::BadConfig => "BAD_CONFIG",
        }
    }

    /// HTTP status the gateway answers with for this code.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::ValidationError => 422,
            ClientCode::ScoringUnavailable => 500,
            ClientCode::InternalFault => 500,
            ClientCode::StoreUnavailable => 503,
            ClientCode::BadConfig => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VitalError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum VitalError {
    #[error("{0}")]
    Validation(String),
    #[error("Error calling scoring API: {0}")]
    Upstream(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Metrics store unavailable")]
    StoreUnavailable,
    #[error("invalid config: {0}")]
    Config(String),
}

impl VitalError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            VitalError::Validation(_) => ClientCode::ValidationError,
            VitalError::Upstream(_) => ClientCode::ScoringUnavailable,
            VitalError::Internal(_) => ClientCode::InternalFault,
            VitalError::StoreUnavailable => ClientCode::StoreUnavailable,
            VitalError::Config(_) => ClientCode::BadConfig,
        }
    }
}
