//! Backup Sweeper Library
//!
//! Prunes timestamped backup artifacts from an object store according to a
//! tiered retention policy (keep everything recent, one per day for the last
//! two months, one per month beyond that).

pub mod config;
pub mod managers;
pub mod retention;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, resolve_all_stores, Config, ResolvedStoreConfig};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::notification::NotificationManager;
pub use managers::sweep::{SweepManager, SweepOutcome, SweepPlan};
pub use retention::{categorize, BackupRecord, Disposition, RetentionPlan};
pub use store::{DirStore, MemoryStore, ObjectStore};
