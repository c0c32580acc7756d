//! Storage and persistence layer
//!
//! - Address registry (single JSON file, replaced atomically under a lock)
//! - Persisted data models

mod models;
mod registry;

pub use models::{AddressRecord, AddressType};
pub use registry::{AddressRegistry, ADDRESS_BUCKET};

use crate::error::StorageError;

/// Record writes and listing used by the reconciliation passes
pub trait RecordStore {
    /// Write `record` under its address; each call commits on its own
    fn upsert(&self, record: &AddressRecord) -> Result<(), StorageError>;

    /// Every stored record; empty or unreadable is `EmptyOrUnavailable`
    fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError>;
}
