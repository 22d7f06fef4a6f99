//! Engine Error Types
//!
//! The single error taxonomy surfaced by the engine. Store and ledger
//! functions never fail; only the mutation coordinator returns these, and
//! always after restoring the pre-mutation state.
//!
//! # Error Categories
//!
//! - `Unauthenticated` - no valid session; the UI should prompt sign-in
//! - `Forbidden` - role/ownership/lock violation
//! - `NotFound` - stale local reference; the entity is confirmed gone
//! - `ValidationFailed` - rejected input; show an inline message
//! - `NetworkFailure` - transient transport failure
//! - `Unknown` - anything else; offer a generic retry

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to the UI by the mutation coordinator
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// No valid session
    #[error("not signed in")]
    Unauthenticated,

    /// Role, ownership, or lock violation
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Human-readable reason
        reason: String,
    },

    /// The referenced entity no longer exists
    #[error("not found: {id}")]
    NotFound {
        /// ID of the missing entity
        id: Uuid,
    },

    /// The server or the engine rejected the input
    #[error("validation failed for '{field}': {message}")]
    ValidationFailed {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Transient transport failure
    #[error("network failure: {message}")]
    NetworkFailure {
        /// Human-readable error message
        message: String,
    },

    /// Anything the taxonomy does not cover
    #[error("unexpected error: {message}")]
    Unknown {
        /// Human-readable error message
        message: String,
    },
}

/// Error payload some endpoints return for validation failures
#[derive(Debug, serde::Deserialize)]
struct ValidationBody {
    field: Option<String>,
    message: Option<String>,
}

impl EngineError {
    /// Create a new forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new network failure error
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Create a new unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Map an HTTP failure status to the taxonomy.
    ///
    /// `entity` is the ID the request referred to, when there is one; a 404
    /// without a referent degrades to `Unknown`.
    pub fn from_response(status: u16, body: &str, entity: Option<Uuid>) -> Self {
        match status {
            401 => Self::Unauthenticated,
            403 => Self::forbidden(if body.trim().is_empty() {
                "not allowed".to_string()
            } else {
                body.trim().to_string()
            }),
            404 => match entity {
                Some(id) => Self::not_found(id),
                None => Self::unknown(format!("missing resource: {}", body.trim())),
            },
            400 | 422 => {
                if let Ok(parsed) = serde_json::from_str::<ValidationBody>(body) {
                    Self::validation(
                        parsed.field.unwrap_or_else(|| "request".to_string()),
                        parsed.message.unwrap_or_else(|| "invalid input".to_string()),
                    )
                } else {
                    Self::validation("request", body.trim().to_string())
                }
            }
            _ => Self::unknown(format!("status {}: {}", status, body.trim())),
        }
    }

    /// Whether the entity this mutation targeted is confirmed gone.
    ///
    /// The coordinator treats this as an implicit remove, not merely an
    /// error message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::network(err.to_string())
        } else if err.is_decode() {
            Self::unknown(format!("malformed response: {}", err))
        } else {
            Self::unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::unknown(format!("JSON error: {}", err))
    }
}
