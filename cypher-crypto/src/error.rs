//! Crypto error types.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in key derivation, encryption and key wrapping.
///
/// Messages never carry plaintext or key material.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Malformed ciphertext or IV, or a key mismatch.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A PEM-encoded RSA key could not be parsed.
    #[error("invalid key format: {0}")]
    KeyFormat(String),

    /// RSA-OAEP unwrapping failed (wrong private key or corrupt data).
    #[error("key unwrap failed: {0}")]
    Unwrap(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
