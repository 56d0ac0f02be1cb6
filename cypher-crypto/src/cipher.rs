//! AES-256-CBC envelopes with PKCS7 padding.
//!
//! Each call to [`encrypt`] draws a fresh 128-bit IV, so encrypting the same
//! plaintext twice under one key yields unrelated envelopes. CBC carries no
//! authentication tag: a wrong key is detected only through the padding check
//! (and, for text, UTF-8 validation), which is probabilistic.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use serde::{Deserialize, Serialize};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of the CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Ciphertext plus the IV needed to decrypt it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherEnvelope {
    /// Base64 (standard alphabet, padded) ciphertext.
    #[serde(rename = "encryptedData")]
    pub ciphertext: String,
    /// Lowercase hex IV. Not secret.
    pub iv: String,
}

/// Encrypts `plaintext` under `key` with a fresh random IV.
pub fn encrypt(key: &DerivedKey, plaintext: &[u8]) -> CryptoResult<CipherEnvelope> {
    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| CryptoError::Encryption(format!("cipher init failed: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(CipherEnvelope {
        ciphertext: BASE64.encode(ciphertext),
        iv: hex::encode(iv),
    })
}

/// Decrypts an envelope produced by [`encrypt`].
pub fn decrypt(key: &DerivedKey, envelope: &CipherEnvelope) -> CryptoResult<Vec<u8>> {
    let iv = hex::decode(&envelope.iv)
        .map_err(|_| CryptoError::Decryption("IV is not valid hex".to_string()))?;
    if iv.len() != IV_SIZE {
        return Err(CryptoError::Decryption(format!(
            "IV must be {IV_SIZE} bytes, got {}",
            iv.len()
        )));
    }

    let ciphertext = BASE64
        .decode(&envelope.ciphertext)
        .map_err(|_| CryptoError::Decryption("ciphertext is not valid base64".to_string()))?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Decryption(format!(
            "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| CryptoError::Decryption(format!("cipher init failed: {e}")))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::Decryption("bad padding (wrong key or tampered data)".to_string()))
}

/// Encrypts UTF-8 text.
pub fn encrypt_string(key: &DerivedKey, plaintext: &str) -> CryptoResult<CipherEnvelope> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypts an envelope whose plaintext must be UTF-8 text.
pub fn decrypt_string(key: &DerivedKey, envelope: &CipherEnvelope) -> CryptoResult<String> {
    let bytes = decrypt(key, envelope)?;
    String::from_utf8(bytes).map_err(|_| {
        CryptoError::Decryption("plaintext is not UTF-8 (wrong key or tampered data)".to_string())
    })
}
