//! Records, metadata and results exchanged with the envelope store.

use chrono::{DateTime, Utc};
use cypher_crypto::CipherEnvelope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive metadata for a stored object. Encrypted as one unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub filename: String,
    pub mimetype: String,
    /// Payload size in bytes.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Metadata {
    /// Metadata stamped with the current time for both timestamps.
    pub fn new(filename: impl Into<String>, mimetype: impl Into<String>, size: u64) -> Self {
        let now = Utc::now();
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            size,
            created_at: now,
            modified_at: now,
        }
    }
}

/// An object key wrapped for one recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKeyEntry {
    /// Base64 RSA-OAEP ciphertext of the object key.
    #[serde(rename = "encryptedKey")]
    pub wrapped_key: String,
    /// PEM of the public key the entry was wrapped under.
    pub public_key: String,
}

/// Recipient identity (public key PEM) to wrapped key.
pub type RecipientKeyMap = BTreeMap<String, WrappedKeyEntry>;

/// The unit of persistence, keyed by `object_id`.
///
/// The two envelopes are written once at ingest and never change; only
/// `key_map` is mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    #[serde(rename = "fileId")]
    pub object_id: String,
    pub metadata_id: String,
    #[serde(rename = "fileKeyMap", default)]
    pub key_map: RecipientKeyMap,
    #[serde(rename = "encryptedFile")]
    pub payload: CipherEnvelope,
    #[serde(rename = "encryptedMetadata")]
    pub metadata: CipherEnvelope,
}

/// Identifiers assigned to a freshly ingested object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub object_id: String,
    pub metadata_id: String,
}

/// A decrypted object: payload bytes plus typed metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedObject {
    pub payload: Vec<u8>,
    pub metadata: Metadata,
}

impl RetrievedObject {
    pub fn name(&self) -> &str {
        &self.metadata.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.metadata.mimetype
    }

    /// Length of the decrypted payload in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// `modified_at` in milliseconds since the Unix epoch.
    pub fn last_modified(&self) -> i64 {
        self.metadata.modified_at.timestamp_millis()
    }

    /// Interprets the payload as UTF-8 text, if it is.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}
