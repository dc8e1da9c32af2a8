//! Chain-specific types and error definitions.

use alloy::transports::TransportError;
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur anywhere in the deployment pipeline.
///
/// Nothing is retried or recovered locally; every variant propagates to the
/// process boundary.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Reading the source or writing the artifact failed.
    #[error("IO error: {0}")]
    Io(String),

    /// The compiler rejected the source, or its output lacks the contract.
    #[error("Compilation failed:\n{0}")]
    Compilation(String),

    /// The node could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An RPC request or a confirmation wait exceeded its bound.
    #[error("Timed out after {secs} seconds: {what}")]
    Timeout { what: String, secs: u64 },

    /// Invalid key, missing key, or key/sender mismatch.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Read-only call could not be performed or decoded.
    #[error("Contract call error: {0}")]
    ContractCall(String),

    /// The node answered with a JSON-RPC error (e.g. nonce too low).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Transaction was mined with a failed status.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeployError {
    /// Classify an alloy transport error: node error responses become
    /// [`DeployError::Rpc`], everything else is a connection problem.
    pub fn from_transport(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => DeployError::Rpc(payload.message.to_string()),
            None => DeployError::Connection(err.to_string()),
        }
    }
}

/// Result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;
