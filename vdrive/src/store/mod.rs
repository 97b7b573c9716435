//! Whole-document key-value persistence.
//!
//! Every document is read and written in one piece. There are no partial
//! updates and no transactions: the last `set` on a key wins.

mod file;
mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Key-value surface the file system, library and blobs are persisted through.
pub trait Store: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written or
    /// cannot be read back.
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces the whole value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and parses a JSON document. Missing and malformed documents both
/// come back as `None`.
pub fn read_document<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed document");
            None
        }
    }
}

pub fn write_document<T: Serialize>(store: &dyn Store, key: &str, document: &T) -> Result<()> {
    let json = serde_json::to_string(document)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn test_document_round_trip() {
        let store = MemoryStore::new();
        write_document(&store, "counter", &Counter { value: 7 }).unwrap();
        let counter: Option<Counter> = read_document(&store, "counter");
        assert_eq!(counter, Some(Counter { value: 7 }));
    }

    #[test]
    fn test_malformed_document_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("counter", "{not json").unwrap();
        assert_eq!(read_document::<Counter>(&store, "counter"), None);

        store.set("counter", r#"{"value":"seven"}"#).unwrap();
        assert_eq!(read_document::<Counter>(&store, "counter"), None);
    }

    #[test]
    fn test_missing_document_reads_as_absent() {
        let store = MemoryStore::new();
        assert_eq!(read_document::<Counter>(&store, "nothing"), None);
    }
}
