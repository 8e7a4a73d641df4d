//! Failure taxonomy for engine calls.

/// Why an engine call failed.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No response arrived within the per-call deadline. The pending
    /// entry has already been removed when this is returned.
    #[error("engine call timed out")]
    Timeout,

    /// The engine answered with an explicit error.
    #[error("engine error {code}: {message}")]
    Remote {
        /// JSON-RPC error code.
        code: i64,
        /// Engine-provided message.
        message: String,
    },

    /// The connection closed or errored while the call was outstanding.
    /// Every call outstanding at that moment fails this way.
    #[error("engine connection lost")]
    ConnectionLost,

    /// A payload could not be encoded or decoded.
    #[error("malformed engine payload: {0}")]
    Decode(String),
}

impl RpcError {
    /// Helper for mapping serde failures.
    pub fn decode(err: impl std::fmt::Display) -> Self {
        RpcError::Decode(err.to_string())
    }
}
