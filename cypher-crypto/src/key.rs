//! Master key handling and deterministic per-object key derivation.
//!
//! Every object key is recomputed on demand from the master key and the
//! object id, so no per-object key is ever stored:
//!
//! 1. `salt = PBKDF2-HMAC-SHA256(object_id, master_key, salt_iterations, 16 bytes)`
//! 2. `key  = PBKDF2-HMAC-SHA256(master_key, salt, key_iterations, 32 bytes)`

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a derived object key in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of the per-object salt produced by the first derivation stage.
pub const SALT_SIZE: usize = 16;

/// The process-wide secret every object key is derived from.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey(String);

impl MasterKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

/// A 256-bit symmetric key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Lowercase hex rendering, for interop with text-keyed tooling.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Iteration counts for the two derivation stages.
///
/// The defaults (1 and 1000) reproduce keys for existing ciphertext.
/// Raising `key_iterations` hardens derivation but changes every key.
/// A count of zero is not a valid PBKDF2 parameter; [`derive_file_key`]
/// runs such a stage with a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    pub salt_iterations: u32,
    pub key_iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            salt_iterations: 1,
            key_iterations: 1000,
        }
    }
}

/// Derives the symmetric key for `object_id`.
///
/// Pure: the same master key, id and params always give the same key.
/// Zero iteration counts are raised to one.
pub fn derive_file_key(master: &MasterKey, object_id: &str, params: &KdfParams) -> DerivedKey {
    let mut salt = [0u8; SALT_SIZE];
    pbkdf2_hmac::<Sha256>(
        object_id.as_bytes(),
        master.as_bytes(),
        params.salt_iterations.max(1),
        &mut salt,
    );

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(master.as_bytes(), &salt, params.key_iterations.max(1), &mut key);
    salt.zeroize();

    DerivedKey(key)
}

/// Generates a random 256-bit key from the OS CSPRNG.
pub fn generate_random_key() -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    DerivedKey(bytes)
}
