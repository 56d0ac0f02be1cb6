//! The envelope store: ingest, retrieve, share and revoke.
//!
//! Object keys are never stored. Every operation re-derives the key from
//! the master key and the object id, so the store holds nothing but
//! ciphertext and the per-recipient wrapped keys.
//!
//! Revocation only removes a recipient's wrapped key from the record. The
//! object key is not rotated and the payload is not re-encrypted, so a
//! recipient who kept a copy of their wrapped key can still decrypt.

use crate::config::CypherConfig;
use crate::error::{CypherError, CypherResult};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::locks::RecordLocks;
use crate::store::{MemoryObjectStore, ObjectStore};
use crate::types::{IngestReceipt, Metadata, ObjectRecord, RetrievedObject, WrappedKeyEntry};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cypher_crypto::{
    decrypt_string, derive_file_key, encrypt_string, recipient_fingerprint, unwrap_key, wrap_key,
    CryptoError, DerivedKey, MasterKey,
};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

/// Envelope-encrypting object store with per-recipient key sharing.
pub struct Cypher {
    master_key: MasterKey,
    store: Arc<dyn ObjectStore>,
    ids: Arc<dyn IdGenerator>,
    locks: RecordLocks,
    config: CypherConfig,
}

impl Cypher {
    /// Creates a store backed by a fresh in-memory repository.
    pub fn new(master_key: MasterKey) -> Self {
        Self::with_store(master_key, Arc::new(MemoryObjectStore::new()))
    }

    /// Creates a store over an existing repository.
    pub fn with_store(master_key: MasterKey, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            master_key,
            store,
            ids: Arc::new(UuidGenerator),
            locks: RecordLocks::new(),
            config: CypherConfig::default(),
        }
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: CypherConfig) -> CypherResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the id generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &CypherConfig {
        &self.config
    }

    fn object_key(&self, object_id: &str) -> DerivedKey {
        derive_file_key(&self.master_key, object_id, &self.config.kdf)
    }

    async fn load(&self, object_id: &str) -> CypherResult<ObjectRecord> {
        self.store
            .get(object_id)
            .await?
            .ok_or_else(|| CypherError::NotFound(object_id.to_string()))
    }

    /// Encrypts `payload` and `metadata` under a fresh object key and
    /// persists them as a new record with no recipients.
    pub async fn ingest(&self, payload: &[u8], metadata: Metadata) -> CypherResult<IngestReceipt> {
        let object_id = self.ids.new_id();
        let metadata_id = self.ids.new_id();

        if metadata.size != payload.len() as u64 {
            warn!(
                "object {object_id}: declared size {} differs from payload length {}",
                metadata.size,
                payload.len()
            );
        }

        let key = self.object_key(&object_id);
        let encrypted_payload = encrypt_string(&key, &BASE64.encode(payload))?;
        let encrypted_metadata = encrypt_string(&key, &serde_json::to_string(&metadata)?)?;

        self.store
            .put(ObjectRecord {
                object_id: object_id.clone(),
                metadata_id: metadata_id.clone(),
                key_map: Default::default(),
                payload: encrypted_payload,
                metadata: encrypted_metadata,
            })
            .await?;

        debug!("ingested object {object_id} ({} bytes)", payload.len());
        Ok(IngestReceipt {
            object_id,
            metadata_id,
        })
    }

    /// Reads `reader` to the end, then ingests the bytes as [`ingest`](Self::ingest).
    pub async fn ingest_reader<R>(&self, mut reader: R, metadata: Metadata) -> CypherResult<IngestReceipt>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload).await?;
        self.ingest(&payload, metadata).await
    }

    /// Decrypts the object stored under `object_id`.
    pub async fn retrieve(&self, object_id: &str) -> CypherResult<RetrievedObject> {
        let record = self.load(object_id).await?;
        let key = self.object_key(object_id);
        let object = decrypt_record(&record, &key, self.config.truncate_to_declared_size)?;

        debug!("retrieved object {object_id}");
        Ok(object)
    }

    /// Returns the raw encrypted record.
    pub async fn record(&self, object_id: &str) -> CypherResult<ObjectRecord> {
        self.load(object_id).await
    }

    /// Grants `recipient_public_pem` access by storing the object key
    /// wrapped under it. Re-sharing to the same key replaces the entry.
    pub async fn share(&self, object_id: &str, recipient_public_pem: &str) -> CypherResult<()> {
        self.load(object_id).await?;

        let key = self.object_key(object_id);
        let wrapped_key = wrap_key(&key, recipient_public_pem)?;

        let _guard = self.locks.acquire(object_id).await;
        let mut record = self.load(object_id).await?;
        record.key_map.insert(
            recipient_public_pem.to_string(),
            WrappedKeyEntry {
                wrapped_key,
                public_key: recipient_public_pem.to_string(),
            },
        );
        self.store.put(record).await?;

        info!(
            "shared object {object_id} with recipient {}",
            recipient_fingerprint(recipient_public_pem)
        );
        Ok(())
    }

    /// Removes `recipient` from the object's key map. Removing a recipient
    /// that holds no entry succeeds without writing.
    pub async fn revoke(&self, object_id: &str, recipient: &str) -> CypherResult<()> {
        let _guard = self.locks.acquire(object_id).await;
        let mut record = self.load(object_id).await?;

        if record.key_map.remove(recipient).is_none() {
            debug!(
                "object {object_id}: recipient {} holds no key, nothing to revoke",
                recipient_fingerprint(recipient)
            );
            return Ok(());
        }
        self.store.put(record).await?;

        info!(
            "revoked recipient {} from object {object_id}",
            recipient_fingerprint(recipient)
        );
        Ok(())
    }

    /// Identities currently holding a wrapped key, in sorted order.
    pub async fn recipients(&self, object_id: &str) -> CypherResult<Vec<String>> {
        let record = self.load(object_id).await?;
        Ok(record.key_map.into_keys().collect())
    }

    /// The wrapped key entry for `recipient`, if any.
    pub async fn wrapped_key(
        &self,
        object_id: &str,
        recipient: &str,
    ) -> CypherResult<Option<WrappedKeyEntry>> {
        let mut record = self.load(object_id).await?;
        Ok(record.key_map.remove(recipient))
    }

    /// Decrypts an object as a recipient: the key comes from the
    /// recipient's wrapped entry and private key, not the master key.
    pub async fn open_shared(
        &self,
        object_id: &str,
        recipient: &str,
        recipient_private_pem: &str,
    ) -> CypherResult<RetrievedObject> {
        let record = self.load(object_id).await?;
        let entry = record
            .key_map
            .get(recipient)
            .ok_or_else(|| CypherError::AccessRevoked {
                object_id: object_id.to_string(),
            })?;

        let key = unwrap_key(&entry.wrapped_key, recipient_private_pem)?;
        let object = decrypt_record(&record, &key, self.config.truncate_to_declared_size)?;

        debug!(
            "recipient {} opened object {object_id}",
            recipient_fingerprint(recipient)
        );
        Ok(object)
    }
}

/// Decrypts both envelopes of `record` with `key`.
///
/// With `truncate` set, the payload is cut to the size declared in the
/// metadata; it is never extended.
pub fn decrypt_record(
    record: &ObjectRecord,
    key: &DerivedKey,
    truncate: bool,
) -> CypherResult<RetrievedObject> {
    let encoded = decrypt_string(key, &record.payload)?;
    let mut payload = BASE64.decode(encoded.trim()).map_err(|_| {
        CryptoError::Decryption("payload is not base64 (wrong key or tampered data)".to_string())
    })?;

    let metadata_json = decrypt_string(key, &record.metadata)?;
    let metadata: Metadata = serde_json::from_str(&metadata_json).map_err(|_| {
        CryptoError::Decryption("metadata did not parse (wrong key or tampered data)".to_string())
    })?;

    if truncate {
        let declared = usize::try_from(metadata.size).unwrap_or(usize::MAX);
        payload.truncate(declared);
    }

    Ok(RetrievedObject { payload, metadata })
}
