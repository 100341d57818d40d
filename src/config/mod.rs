//! Configuration module for backup-sweeper
//!
//! Handles loading, validating, and resolving configuration from TOML files.
//!
//! Store-level settings override global defaults; currently only the
//! datetime extraction pattern is inheritable.
//!
//! ## Example Usage
//!
//! ```no_run
//! use backup_sweeper::config;
//!
//! # fn main() -> Result<(), config::ConfigError> {
//! let config = config::load_config("backup-sweeper.toml")?;
//! let resolved_stores = config::resolve_all_stores(&config);
//!
//! for (name, store) in resolved_stores {
//!     println!("Store: {}, root: {:?}", name, store.root);
//! }
//! # Ok(())
//! # }
//! ```

mod loader;
mod types;

pub use loader::{load_config, resolve_all_stores, resolve_store, ConfigError, Result};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
