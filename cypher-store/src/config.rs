//! Envelope store configuration.

use crate::error::{CypherError, CypherResult};
use cypher_crypto::KdfParams;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Cypher`](crate::Cypher) instance.
///
/// The master key is deliberately not part of the config; it is passed to
/// the constructor and never serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CypherConfig {
    /// PBKDF2 iteration counts. Must match the counts used when the
    /// records were written.
    pub kdf: KdfParams,

    /// Clamp decrypted payloads to the size declared in their metadata.
    pub truncate_to_declared_size: bool,
}

impl Default for CypherConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            truncate_to_declared_size: true,
        }
    }
}

impl CypherConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> CypherResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CypherResult<()> {
        if self.kdf.salt_iterations == 0 {
            return Err(CypherError::Config(
                "kdf.salt_iterations must be at least 1".to_string(),
            ));
        }
        if self.kdf.key_iterations == 0 {
            return Err(CypherError::Config(
                "kdf.key_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
