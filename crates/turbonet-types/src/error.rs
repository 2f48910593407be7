//! Shared error types for the TurboNET bridge.

use thiserror::Error;

/// Top-level error type for the TurboNET bridge.
///
/// Every variant is terminal for the invocation that produced it: the router
/// renders it into the single reply for that command and nothing is retried.
#[derive(Error, Debug)]
pub enum TurboNetError {
    /// A command argument was missing or malformed. Carries the usage reply.
    #[error("Usage error: {0}")]
    Usage(String),

    /// No credential is bound for the identity the command acts as.
    #[error("No credential bound for user {0}")]
    Unauthenticated(String),

    /// The HTTP exchange failed before a response was received.
    #[error("Transport error calling {endpoint}: {reason}")]
    Transport {
        /// API path that was being called.
        endpoint: String,
        /// Underlying cause (connection refused, timeout, DNS, ...).
        reason: String,
    },

    /// The API answered with a status other than 200.
    #[error("API error from {endpoint} (HTTP {status}): {message}")]
    Api {
        /// API path that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Best-effort message extracted from the error body.
        message: String,
    },

    /// A 200 response whose body could not be read as the expected JSON.
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// API path that was called.
        endpoint: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A 200 response was missing a field the command cannot do without.
    #[error("Response from {endpoint} is missing field '{field}'")]
    MissingField {
        /// API path that was called.
        endpoint: String,
        /// JSON field name.
        field: String,
    },

    /// The credential store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for Result with TurboNetError.
pub type TurboNetResult<T> = Result<T, TurboNetError>;
