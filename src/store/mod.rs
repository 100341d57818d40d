//! Object store abstraction
//!
//! The sweep pipeline only needs two operations from the storage backend:
//! list keys under a prefix and delete a single key. Keeping this behind a
//! trait lets tests run against an in-memory store and keeps the retention
//! logic free of I/O.

pub mod dir;
pub mod memory;

use anyhow::Result;

pub use dir::DirStore;
pub use memory::MemoryStore;

/// Storage backend holding backup artifacts addressed by string keys.
pub trait ObjectStore: Send + Sync {
    /// List all keys under the given prefix, in unspecified order.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete a single key. Deleting a key that is already gone is not an
    /// error; deletions are independent and idempotent.
    fn delete(&self, key: &str) -> Result<()>;
}
