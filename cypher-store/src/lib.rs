//! Envelope store for Cypher.
//!
//! Provides per-object envelope encryption with:
//! - Deterministic per-object keys derived from one master key
//! - Independent AES-256-CBC envelopes for payload and metadata
//! - Multi-recipient sharing via RSA-OAEP wrapped keys
//! - Revocation by key-map removal (payload untouched)
//! - Pluggable record storage behind the `ObjectStore` trait

pub mod config;
pub mod cypher;
pub mod error;
pub mod ids;
pub mod locks;
pub mod store;
pub mod types;

pub use config::CypherConfig;
pub use cypher::{decrypt_record, Cypher};
pub use error::{CypherError, CypherResult};
pub use ids::{IdGenerator, UuidGenerator};
pub use store::{DirectoryObjectStore, MemoryObjectStore, ObjectStore};
pub use types::*;
