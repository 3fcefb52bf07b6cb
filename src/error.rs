//! @acp:module "Errors"
//! @acp:summary "Library error type and result alias"
//! @acp:domain cli
//! @acp:layer types
//!
//! Error types
//!
//! Library-level failures. Protocol outcomes the user can act on (empty pool,
//! shortfalls, duplicate names) are not errors; they are modelled as outcome
//! values in [`crate::api`]. What lands here is a broken transport, an
//! unreadable body or a local I/O problem.

use thiserror::Error;

/// Errors raised by the testbank library
#[derive(Debug, Error)]
pub enum TestbankError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unexpected response from {endpoint} (status {status}): {reason}")]
    InvalidResponse {
        endpoint: String,
        status: u16,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TestbankError {
    pub(crate) fn invalid_response(
        endpoint: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
    ) -> Self {
        TestbankError::InvalidResponse {
            endpoint: endpoint.into(),
            status,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, TestbankError>;
