//! Shared helpers for envelope store integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use cypher_crypto::{MasterKey, RecipientKeyPair};
use cypher_store::{Cypher, IdGenerator, Metadata};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

pub const MASTER_KEY: &str = "test-master-key";

const TEST_RSA_BITS: usize = 1024;

/// Installs a test-writer subscriber once per binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cypher_store=debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn test_cypher() -> Cypher {
    init_tracing();
    Cypher::new(MasterKey::new(MASTER_KEY))
}

/// Metadata for the canonical `"Hello, World!"` object.
pub fn hello_metadata() -> Metadata {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    Metadata {
        filename: "test.txt".into(),
        mimetype: "text/plain".into(),
        size: 13,
        created_at: created,
        modified_at: created + chrono::Duration::milliseconds(1500),
    }
}

pub fn alice() -> &'static RecipientKeyPair {
    static ALICE: OnceLock<RecipientKeyPair> = OnceLock::new();
    ALICE.get_or_init(|| RecipientKeyPair::generate(TEST_RSA_BITS).expect("keygen must succeed"))
}

pub fn bob() -> &'static RecipientKeyPair {
    static BOB: OnceLock<RecipientKeyPair> = OnceLock::new();
    BOB.get_or_init(|| RecipientKeyPair::generate(TEST_RSA_BITS).expect("keygen must succeed"))
}

/// A pool of distinct recipients for contention tests.
pub fn recipients(n: usize) -> Vec<RecipientKeyPair> {
    (0..n)
        .map(|_| RecipientKeyPair::generate(TEST_RSA_BITS).expect("keygen must succeed"))
        .collect()
}

/// Predictable ids: `object-1`, `object-2`, ...
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        format!("object-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
