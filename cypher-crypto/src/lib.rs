//! Cryptographic primitives for Cypher envelope encryption.
//!
//! # Architecture
//!
//! A single master key never encrypts data directly. Instead:
//!
//! 1. **Object Key**: derived deterministically from the master key and the
//!    object id with two PBKDF2-HMAC-SHA256 passes. It is never stored;
//!    any holder of the master key recomputes it from the id alone.
//!
//! 2. **Envelopes**: payload and metadata are encrypted independently under
//!    the object key with AES-256-CBC, each with its own random IV.
//!
//! 3. **Wrapped Keys**: to share an object, its key is wrapped with the
//!    recipient's RSA public key (OAEP, SHA-256). Only the matching private
//!    key can unwrap it. Ciphertext is never duplicated per recipient.

pub mod cipher;
mod error;
pub mod key;
pub mod wrap;

pub use cipher::{
    decrypt, decrypt_string, encrypt, encrypt_string, CipherEnvelope, BLOCK_SIZE, IV_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_file_key, generate_random_key, DerivedKey, KdfParams, MasterKey, KEY_SIZE, SALT_SIZE,
};
pub use wrap::{
    recipient_fingerprint, unwrap_key, wrap_key, RecipientKeyPair, DEFAULT_RSA_BITS, MIN_RSA_BITS,
};
