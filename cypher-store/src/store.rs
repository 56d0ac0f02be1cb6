//! Keyed repositories for object records.
//!
//! The envelope store only ever fetches or replaces a whole record by its
//! object id, so backends need nothing beyond `get` and `put`.

use crate::error::{CypherError, CypherResult};
use crate::types::ObjectRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Persistence for [`ObjectRecord`]s keyed by object id.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches the record for `object_id`, or `None` if absent.
    async fn get(&self, object_id: &str) -> CypherResult<Option<ObjectRecord>>;

    /// Inserts or replaces the record stored under `record.object_id`.
    async fn put(&self, record: ObjectRecord) -> CypherResult<()>;
}

// ── MemoryObjectStore ───────────────────────────────────────────

/// Thread-safe in-memory store. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    records: Arc<RwLock<HashMap<String, ObjectRecord>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, object_id: &str) -> CypherResult<Option<ObjectRecord>> {
        Ok(self.records.read().await.get(object_id).cloned())
    }

    async fn put(&self, record: ObjectRecord) -> CypherResult<()> {
        self.records
            .write()
            .await
            .insert(record.object_id.clone(), record);
        Ok(())
    }
}

// ── DirectoryObjectStore ────────────────────────────────────────

/// Longest object id accepted as a file name.
const MAX_ID_LEN: usize = 128;

/// Whether `object_id` is safe to use as a file name.
pub fn is_valid_object_id(object_id: &str) -> bool {
    !object_id.is_empty()
        && object_id.len() <= MAX_ID_LEN
        && object_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Stores each record as `<root>/<object_id>.json`.
///
/// Writes land in a temporary file that is renamed into place, so readers
/// see either the old record or the new one.
#[derive(Clone, Debug)]
pub struct DirectoryObjectStore {
    root: PathBuf,
}

impl DirectoryObjectStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> CypherResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, object_id: &str) -> PathBuf {
        self.root.join(format!("{object_id}.json"))
    }
}

async fn write_then_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(tmp, bytes).await?;
    tokio::fs::rename(tmp, target).await
}

#[async_trait]
impl ObjectStore for DirectoryObjectStore {
    async fn get(&self, object_id: &str) -> CypherResult<Option<ObjectRecord>> {
        if !is_valid_object_id(object_id) {
            warn!("rejecting lookup of malformed object id");
            return Ok(None);
        }

        let bytes = match tokio::fs::read(self.record_path(object_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: ObjectRecord = serde_json::from_slice(&bytes)?;
        if record.object_id != object_id {
            return Err(CypherError::Store(format!(
                "record file for {object_id} holds object {}",
                record.object_id
            )));
        }
        Ok(Some(record))
    }

    async fn put(&self, record: ObjectRecord) -> CypherResult<()> {
        if !is_valid_object_id(&record.object_id) {
            return Err(CypherError::InvalidObjectId(record.object_id));
        }

        let bytes = serde_json::to_vec_pretty(&record)?;
        let target = self.record_path(&record.object_id);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", record.object_id, Uuid::new_v4()));

        if let Err(e) = write_then_rename(&tmp, &target, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("wrote {} bytes for object {}", bytes.len(), record.object_id);
        Ok(())
    }
}
