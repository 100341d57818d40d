use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::utils::timestamp::DEFAULT_DATETIME_PATTERN;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    pub stores: HashMap<String, StoreConfig>,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Default regex for extracting the datetime from backup keys
    #[serde(default = "default_datetime_pattern")]
    pub datetime_pattern: String,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
    #[serde(default = "default_log_max_size_mb")]
    pub log_max_size_mb: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            datetime_pattern: default_datetime_pattern(),
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
            log_max_size_mb: default_log_max_size_mb(),
        }
    }
}

/// Backup store configuration (raw, before defaults are merged)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Root directory holding the backup artifacts
    pub root: PathBuf,

    /// Only keys under this prefix are considered
    #[serde(default)]
    pub prefix: String,

    /// Per-store override of the datetime extraction pattern
    #[serde(default)]
    pub datetime_pattern: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Resolved store configuration (after merging global defaults)
#[derive(Debug, Clone)]
pub struct ResolvedStoreConfig {
    pub name: String,
    pub root: PathBuf,
    pub prefix: String,
    pub datetime_pattern: String,
    pub description: String,
    pub enabled: bool,
}

/// Notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Webhook URL; empty disables notifications entirely
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_notify_on")]
    pub notify_on: Vec<NotifyEvent>,

    #[serde(default = "default_rate_limit")]
    pub rate_limit_minutes: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            notify_on: default_notify_on(),
            rate_limit_minutes: default_rate_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyEvent {
    Failure,
    Warning,
    Success,
}

// Default value functions

fn default_datetime_pattern() -> String {
    DEFAULT_DATETIME_PATTERN.to_string()
}
fn default_log_directory() -> PathBuf {
    PathBuf::from("~/logs")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_max_files() -> u32 {
    10
}
fn default_log_max_size_mb() -> u64 {
    10
}
fn default_enabled() -> bool {
    true
}
fn default_notify_on() -> Vec<NotifyEvent> {
    vec![NotifyEvent::Failure, NotifyEvent::Warning]
}
fn default_rate_limit() -> u64 {
    60
}
