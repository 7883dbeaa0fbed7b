//! Terminal error type.

use thiserror::Error;

/// Failures on the terminal side of a checkout.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// The server rejected the request with a business error. The message
    /// is shown to the cashier verbatim; the cart is left intact so the
    /// problem can be corrected and checkout retried.
    #[error("{message}")]
    Rejected { message: String },

    /// The request timed out. The sale may or may not have been committed
    /// server-side; the cashier must check before retrying.
    #[error("Request timed out after {seconds}s")]
    RequestTimeout { seconds: u64 },

    /// Network-level failure reaching the server.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with something that was not the expected
    /// envelope.
    #[error("Unexpected server response: {0}")]
    BadResponse(String),

    /// Session persistence failure.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

