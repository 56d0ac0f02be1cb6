//! Envelope store error types.

use cypher_crypto::CryptoError;
use thiserror::Error;

/// Result type for envelope store operations.
pub type CypherResult<T> = Result<T, CypherError>;

/// Errors that can occur in envelope store operations.
#[derive(Debug, Error)]
pub enum CypherError {
    /// No record exists for the object id.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Decryption, key format or unwrap failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The recipient holds no wrapped key for the object.
    #[error("access revoked or never granted for object {object_id}")]
    AccessRevoked { object_id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store operation failed: {0}")]
    Store(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
