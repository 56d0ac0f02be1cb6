//! RSA-OAEP key wrapping for share recipients.
//!
//! An object key is wrapped under a recipient's RSA public key using OAEP
//! with SHA-256 as both the label hash and the MGF1 hash. The wrapped bytes
//! are base64-encoded for storage in the record's key map. Keys cross this
//! boundary as PEM text so callers never handle RSA types directly.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DerivedKey, KEY_SIZE};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Smallest modulus accepted by [`RecipientKeyPair::generate`].
///
/// OAEP-SHA256 needs `2 * 32 + 2` bytes of overhead, so 1024 bits still
/// leaves room for a 32-byte key.
pub const MIN_RSA_BITS: usize = 1024;

/// Modulus size used when callers have no preference.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// Smallest modulus, in bytes, that can carry an OAEP-SHA256 wrapped key.
const MIN_OAEP_MODULUS_BYTES: usize = KEY_SIZE + 2 * 32 + 2;

/// PEM-encoded RSA keypair for a share recipient.
pub struct RecipientKeyPair {
    /// SubjectPublicKeyInfo PEM (`BEGIN PUBLIC KEY`). Doubles as the
    /// recipient's identity in an object's key map.
    pub public_pem: String,
    /// PKCS#8 PEM (`BEGIN PRIVATE KEY`). Zeroized on drop.
    pub private_pem: Zeroizing<String>,
}

impl RecipientKeyPair {
    /// Generates a fresh keypair with a `bits`-bit modulus.
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        if bits < MIN_RSA_BITS {
            return Err(CryptoError::KeyGeneration(format!(
                "modulus of {bits} bits is below the {MIN_RSA_BITS}-bit minimum"
            )));
        }

        let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);

        let public_pem = public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("public key encoding failed: {e}")))?;
        let private_pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("private key encoding failed: {e}")))?;

        Ok(Self {
            public_pem,
            private_pem,
        })
    }
}

/// Short, log-safe fingerprint of a recipient's public key PEM.
pub fn recipient_fingerprint(public_pem: &str) -> String {
    let digest = Sha256::digest(public_pem.as_bytes());
    hex::encode(&digest[..8])
}

fn parse_public_key(pem: &str) -> CryptoResult<RsaPublicKey> {
    let pem = pem.trim();
    if pem.contains("BEGIN RSA PUBLIC KEY") {
        RsaPublicKey::from_pkcs1_pem(pem)
            .map_err(|e| CryptoError::KeyFormat(format!("invalid PKCS#1 public key: {e}")))
    } else {
        RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::KeyFormat(format!("invalid public key: {e}")))
    }
}

fn parse_private_key(pem: &str) -> CryptoResult<RsaPrivateKey> {
    let pem = pem.trim();
    if pem.contains("BEGIN RSA PRIVATE KEY") {
        RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|_| CryptoError::KeyFormat("invalid PKCS#1 private key".to_string()))
    } else {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|_| CryptoError::KeyFormat("invalid PKCS#8 private key".to_string()))
    }
}

/// Wraps `key` for the holder of `recipient_public_pem`.
///
/// Returns base64 ciphertext. OAEP is randomized, so wrapping the same key
/// twice gives different output.
pub fn wrap_key(key: &DerivedKey, recipient_public_pem: &str) -> CryptoResult<String> {
    let public = parse_public_key(recipient_public_pem)?;
    if public.size() < MIN_OAEP_MODULUS_BYTES {
        return Err(CryptoError::KeyFormat(format!(
            "RSA modulus of {} bits is too small for OAEP-SHA256",
            public.size() * 8
        )));
    }
    let wrapped = public
        .encrypt(&mut rand::rngs::OsRng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("key wrap failed: {e}")))?;
    Ok(BASE64.encode(wrapped))
}

/// Recovers an object key wrapped by [`wrap_key`].
pub fn unwrap_key(wrapped: &str, recipient_private_pem: &str) -> CryptoResult<DerivedKey> {
    let private = parse_private_key(recipient_private_pem)?;
    let ciphertext = BASE64
        .decode(wrapped.trim())
        .map_err(|_| CryptoError::Unwrap("wrapped key is not valid base64".to_string()))?;

    let plaintext = Zeroizing::new(
        private
            .decrypt(Oaep::new::<Sha256>(), &ciphertext)
            .map_err(|_| CryptoError::Unwrap("OAEP decryption failed (wrong key or corrupt data)".to_string()))?,
    );

    if plaintext.len() != KEY_SIZE {
        return Err(CryptoError::Unwrap(format!(
            "unwrapped key is {} bytes, expected {KEY_SIZE}",
            plaintext.len()
        )));
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&plaintext);
    Ok(DerivedKey::from_bytes(bytes))
}
