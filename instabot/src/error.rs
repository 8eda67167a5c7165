//! Error types that surface to the top level.
//!
//! Eligibility denials and spent quotas are not errors; they never appear
//! here.

/// Failure reported by the remote service client. Every variant is treated
/// as transient and retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed or inconsistent configuration, detected before any network
    /// activity.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A remote operation failed on every allowed attempt.
    #[error("{operation} failed after {attempts} attempts, last error: {last}")]
    Unrecoverable {
        operation: String,
        attempts: u32,
        last: RemoteError,
    },
}

impl EngineError {
    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Configuration(message.into())
    }
}
