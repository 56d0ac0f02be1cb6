//! Identifier generation for new objects.

use uuid::Uuid;

/// Source of statistically unique ids for objects and their metadata.
///
/// Object ids feed key derivation, so an implementation must never repeat
/// an id across the lifetime of a store.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Random UUID v4 ids (122 bits of randomness).
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
