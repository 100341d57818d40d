//! Sweep manager - orchestrates listing, categorization, and deletion

use crate::config::ResolvedStoreConfig;
use crate::managers::notification::NotificationManager;
use crate::retention::{self, BackupRecord, RetentionPlan};
use crate::store::ObjectStore;
use crate::utils::locker::SweepLock;
use crate::utils::timestamp::extract_timestamp;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use tracing::{error, info, warn};

/// Categorized view of one store at one point in time.
#[derive(Debug, Serialize)]
pub struct SweepPlan {
    pub store: String,
    /// Keep/delete partition of all parseable keys.
    #[serde(flatten)]
    pub retention: RetentionPlan,
    /// Keys whose timestamp could not be extracted; left untouched.
    pub skipped: Vec<String>,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.retention.total() == 0 && self.skipped.is_empty()
    }
}

/// Result of executing the delete side of a plan.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub deleted: usize,
    pub attempted: usize,
    /// Keys whose deletion failed, with the error message.
    pub failures: Vec<(String, String)>,
}

impl SweepOutcome {
    pub fn fully_successful(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SweepManager {
    store_config: ResolvedStoreConfig,
    store: Box<dyn ObjectStore>,
    notification_manager: Option<NotificationManager>,
}

impl SweepManager {
    /// Create a new sweep manager for one store.
    pub fn new(store_config: ResolvedStoreConfig, store: Box<dyn ObjectStore>) -> Self {
        Self {
            store_config,
            store,
            notification_manager: None,
        }
    }

    /// Attach a notification manager.
    pub fn with_notification_manager(mut self, manager: NotificationManager) -> Self {
        self.notification_manager = Some(manager);
        self
    }

    pub fn store_name(&self) -> &str {
        &self.store_config.name
    }

    /// Build the retention plan against the current wall clock.
    pub fn plan(&self) -> Result<SweepPlan> {
        self.plan_at(Local::now().naive_local())
    }

    /// Build the retention plan against an explicit `now`.
    ///
    /// Listing failures abort the whole operation. Keys without a parseable
    /// timestamp are skipped with a warning and reported separately; they
    /// are never deleted.
    pub fn plan_at(&self, now: NaiveDateTime) -> Result<SweepPlan> {
        let pattern = Regex::new(&self.store_config.datetime_pattern).with_context(|| {
            format!(
                "Invalid datetime pattern for store '{}': {}",
                self.store_config.name, self.store_config.datetime_pattern
            )
        })?;

        info!(
            "Listing backups in store '{}' with prefix '{}'",
            self.store_config.name, self.store_config.prefix
        );

        let keys = self
            .store
            .list(&self.store_config.prefix)
            .with_context(|| format!("Failed to list store '{}'", self.store_config.name))?;

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for key in keys {
            match extract_timestamp(&key, &pattern) {
                Some(timestamp) => records.push(BackupRecord::new(key, timestamp)),
                None => {
                    warn!("Could not extract timestamp from '{}', skipping", key);
                    skipped.push(key);
                }
            }
        }

        info!(
            "Found {} backups ({} keys skipped)",
            records.len(),
            skipped.len()
        );

        let retention = retention::categorize(records, now);

        Ok(SweepPlan {
            store: self.store_config.name.clone(),
            retention,
            skipped,
        })
    }

    /// Delete everything in the plan's delete set.
    ///
    /// Holds the per-store lock for the duration. Deletion failures are
    /// per-key and non-fatal; the outcome carries the counts and the caller
    /// reports them.
    pub fn execute(&self, plan: &SweepPlan) -> Result<SweepOutcome> {
        let mut lock = SweepLock::open(&self.store_config.name)?;
        let _guard = lock.try_exclusive()?;

        let mut outcome = SweepOutcome::default();

        for record in &plan.retention.delete {
            outcome.attempted += 1;

            match self.store.delete(&record.key) {
                Ok(()) => {
                    info!("Deleted: {}", record.key);
                    outcome.deleted += 1;
                }
                Err(e) => {
                    error!("Failed to delete '{}': {:#}", record.key, e);
                    outcome.failures.push((record.key.clone(), format!("{:#}", e)));
                }
            }
        }

        info!(
            "Sweep of store '{}' deleted {}/{} backups",
            self.store_config.name, outcome.deleted, outcome.attempted
        );

        self.notify(&outcome);

        Ok(outcome)
    }

    /// Send the post-sweep notification (if a manager is configured).
    fn notify(&self, outcome: &SweepOutcome) {
        if let Some(ref manager) = self.notification_manager {
            let result = if outcome.fully_successful() {
                manager.send_success(&self.store_config.name, outcome.deleted)
            } else {
                manager.send_warning(&self.store_config.name, outcome.deleted, outcome.attempted)
            };

            if let Err(e) = result {
                warn!("Failed to send sweep notification: {}", e);
            }
        }
    }

    /// Report a sweep-level failure (listing errors and the like).
    pub fn notify_failure(&self, error: &str) {
        if let Some(ref manager) = self.notification_manager {
            if let Err(e) = manager.send_failure(&self.store_config.name, error) {
                warn!("Failed to send failure notification: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::utils::timestamp::DEFAULT_DATETIME_PATTERN;
    use std::path::PathBuf;

    fn store_config(name: &str) -> ResolvedStoreConfig {
        ResolvedStoreConfig {
            name: name.to_string(),
            root: PathBuf::from("/unused"),
            prefix: String::new(),
            datetime_pattern: DEFAULT_DATETIME_PATTERN.to_string(),
            description: String::new(),
            enabled: true,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-11-29 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_plan_skips_unparseable_keys() {
        let store = MemoryStore::with_keys([
            "db_2024-11-28_02-00-00.sql.gz",
            "backup_2024-13-40.tar",
            "README.md",
        ]);
        let manager = SweepManager::new(store_config("plan-skips"), Box::new(store));

        let plan = manager.plan_at(now()).unwrap();

        assert_eq!(plan.retention.total(), 1);
        assert_eq!(plan.skipped.len(), 2);
        assert!(plan.skipped.contains(&"README.md".to_string()));
        assert!(plan.skipped.contains(&"backup_2024-13-40.tar".to_string()));
    }

    #[test]
    fn test_plan_empty_store() {
        let store = MemoryStore::new();
        let manager = SweepManager::new(store_config("plan-empty"), Box::new(store));

        let plan = manager.plan_at(now()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_execute_deletes_only_the_delete_set() {
        // Two same-day backups in the daily tier: newest kept, oldest deleted.
        let store = MemoryStore::with_keys([
            "db_2024-11-05_02-00-00.sql.gz",
            "db_2024-11-05_20-00-00.sql.gz",
        ]);
        let manager = SweepManager::new(store_config("exec-deletes"), Box::new(store.clone()));

        let plan = manager.plan_at(now()).unwrap();
        assert_eq!(plan.retention.delete.len(), 1);

        let outcome = manager.execute(&plan).unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.attempted, 1);
        assert!(outcome.fully_successful());

        assert!(!store.contains("db_2024-11-05_02-00-00.sql.gz"));
        assert!(store.contains("db_2024-11-05_20-00-00.sql.gz"));
    }

    #[test]
    fn test_execute_continues_past_per_key_failures() {
        let store = MemoryStore::with_keys([
            "db_2024-09-02_02-00-00.sql.gz",
            "db_2024-09-10_02-00-00.sql.gz",
            "db_2024-09-15_02-00-00.sql.gz",
        ])
        .fail_delete_of("db_2024-09-02_02-00-00.sql.gz");

        let manager = SweepManager::new(store_config("exec-partial"), Box::new(store.clone()));

        // All three are in the monthly tier; only the newest survives.
        let plan = manager.plan_at(now()).unwrap();
        assert_eq!(plan.retention.delete.len(), 2);

        let outcome = manager.execute(&plan).unwrap();
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "db_2024-09-02_02-00-00.sql.gz");

        // The failed key is still there, the other duplicate is gone.
        assert!(store.contains("db_2024-09-02_02-00-00.sql.gz"));
        assert!(!store.contains("db_2024-09-10_02-00-00.sql.gz"));
    }

    #[test]
    fn test_plan_respects_prefix() {
        let store = MemoryStore::with_keys([
            "db_2024-11-28_02-00-00.sql.gz",
            "files_2024-11-28_02-00-00.tar",
        ]);
        let mut config = store_config("plan-prefix");
        config.prefix = "db_".to_string();
        let manager = SweepManager::new(config, Box::new(store));

        let plan = manager.plan_at(now()).unwrap();
        assert_eq!(plan.retention.total(), 1);
        assert_eq!(plan.retention.keep[0].key, "db_2024-11-28_02-00-00.sql.gz");
    }
}
