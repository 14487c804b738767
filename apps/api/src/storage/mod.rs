//! Key-value storage capability behind the skill profile and the handoff slot.
//!
//! `FileStore` is the durable backend (one file per key, local to the user).
//! `MemoryStore` is the transient backend, scoped to the lifetime of the process.

use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Quota exceeded: {needed} bytes requested, {quota} allowed")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// A string-valued key-value store. Implementations are internally synchronized.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
