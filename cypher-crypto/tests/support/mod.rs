//! Shared RSA fixtures. Key generation is slow, so each test binary
//! generates its recipients once.

#![allow(dead_code)]

use cypher_crypto::RecipientKeyPair;
use std::sync::OnceLock;

const TEST_RSA_BITS: usize = 1024;

pub fn alice() -> &'static RecipientKeyPair {
    static ALICE: OnceLock<RecipientKeyPair> = OnceLock::new();
    ALICE.get_or_init(|| RecipientKeyPair::generate(TEST_RSA_BITS).expect("keygen must succeed"))
}

pub fn bob() -> &'static RecipientKeyPair {
    static BOB: OnceLock<RecipientKeyPair> = OnceLock::new();
    BOB.get_or_init(|| RecipientKeyPair::generate(TEST_RSA_BITS).expect("keygen must succeed"))
}
