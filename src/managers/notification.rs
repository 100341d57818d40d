//! Webhook notification manager
//!
//! Sends sweep results to a Discord-compatible webhook. The webhook URL
//! comes from the config file; nothing secret lives in the source.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

use crate::config::{NotificationConfig, NotifyEvent};

/// Notification manager for sending webhook messages
pub struct NotificationManager {
    config: NotificationConfig,
    cache_path: PathBuf,
}

/// Embed color codes (decimal)
#[derive(Debug, Clone, Copy)]
pub enum NotificationColor {
    /// Red - for failures
    Failure = 15158332, // #E74C3C
    /// Orange - for warnings (partial delete failures)
    Warning = 15105570, // #E67E22
    /// Green - for success
    Success = 3066993, // #2ECC71
}

impl NotificationColor {
    fn as_decimal(&self) -> u32 {
        *self as u32
    }
}

/// Notification payload to send
#[derive(Debug, Clone)]
pub struct Notification {
    pub event_type: NotifyEvent,
    pub store_name: String,
    pub message: String,
    pub error: Option<String>,
    pub deleted: Option<usize>,
    pub attempted: Option<usize>,
}

/// Webhook payload (Discord embed format)
#[derive(Debug, Serialize)]
struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    embeds: Vec<WebhookEmbed>,
}

#[derive(Debug, Serialize)]
struct WebhookEmbed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<WebhookField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<WebhookFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct WebhookField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct WebhookFooter {
    text: String,
}

/// Rate limit cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Unix timestamp of last notification
    last_sent: u64,
    /// Count of notifications sent in current window
    count: u32,
}

/// Rate limit cache
#[derive(Debug, Serialize, Deserialize, Default)]
struct NotificationCache {
    entries: HashMap<String, CacheEntry>,
}

impl NotificationManager {
    /// Create a new notification manager
    pub fn new(config: NotificationConfig) -> Self {
        let cache_path = Self::get_cache_path();
        Self { config, cache_path }
    }

    /// Get the cache file path
    fn get_cache_path() -> PathBuf {
        if let Some(cache_dir) = dirs::cache_dir() {
            cache_dir.join("backup-sweeper-notifications.json")
        } else {
            PathBuf::from("/tmp/backup-sweeper-notifications.json")
        }
    }

    /// Check if notifications are enabled for an event type
    pub fn is_enabled(&self, event: &NotifyEvent) -> bool {
        if self.config.webhook_url.is_empty() {
            return false;
        }
        self.config.notify_on.contains(event)
    }

    /// Send a notification if enabled and not rate-limited
    pub fn send(&self, notification: Notification) -> Result<()> {
        if !self.is_enabled(&notification.event_type) {
            debug!(
                "Notification type {:?} not enabled, skipping",
                notification.event_type
            );
            return Ok(());
        }

        let cache_key = format!(
            "{}:{:?}",
            notification.store_name, notification.event_type
        );

        if self.is_rate_limited(&cache_key)? {
            debug!("Notification rate-limited for key: {}", cache_key);
            return Ok(());
        }

        let payload = self.build_payload(&notification);
        self.send_webhook(&payload)?;

        self.update_cache(&cache_key)?;

        info!(
            "Sent {:?} notification for store '{}'",
            notification.event_type, notification.store_name
        );

        Ok(())
    }

    /// Send a failure notification
    pub fn send_failure(&self, store_name: &str, error: &str) -> Result<()> {
        self.send(Notification {
            event_type: NotifyEvent::Failure,
            store_name: store_name.to_string(),
            message: format!("Sweep failed for store '{}'", store_name),
            error: Some(error.to_string()),
            deleted: None,
            attempted: None,
        })
    }

    /// Send a warning notification (some deletions failed)
    pub fn send_warning(&self, store_name: &str, deleted: usize, attempted: usize) -> Result<()> {
        self.send(Notification {
            event_type: NotifyEvent::Warning,
            store_name: store_name.to_string(),
            message: format!(
                "Sweep for store '{}' deleted {}/{} backups",
                store_name, deleted, attempted
            ),
            error: None,
            deleted: Some(deleted),
            attempted: Some(attempted),
        })
    }

    /// Send a success notification
    pub fn send_success(&self, store_name: &str, deleted: usize) -> Result<()> {
        self.send(Notification {
            event_type: NotifyEvent::Success,
            store_name: store_name.to_string(),
            message: format!("Sweep completed for store '{}'", store_name),
            error: None,
            deleted: Some(deleted),
            attempted: Some(deleted),
        })
    }

    /// Build webhook payload
    fn build_payload(&self, notification: &Notification) -> WebhookPayload {
        let (color, emoji) = match notification.event_type {
            NotifyEvent::Failure => (NotificationColor::Failure, "\u{274C}"), // Red X
            NotifyEvent::Warning => (NotificationColor::Warning, "\u{26A0}\u{FE0F}"), // Warning
            NotifyEvent::Success => (NotificationColor::Success, "\u{2705}"), // Green check
        };

        let title = format!("{} Backup Sweeper: {:?}", emoji, notification.event_type);

        let mut fields = vec![WebhookField {
            name: "Store".to_string(),
            value: notification.store_name.clone(),
            inline: true,
        }];

        if let Some(deleted) = notification.deleted {
            fields.push(WebhookField {
                name: "Deleted".to_string(),
                value: deleted.to_string(),
                inline: true,
            });
        }

        if let Some(attempted) = notification.attempted {
            fields.push(WebhookField {
                name: "Attempted".to_string(),
                value: attempted.to_string(),
                inline: true,
            });
        }

        if let Some(ref error) = notification.error {
            // Truncate long error messages; count chars, not bytes, so
            // multi-byte input never splits mid-character.
            let error_display = if error.chars().count() > 500 {
                let truncated: String = error.chars().take(497).collect();
                format!("{}...", truncated)
            } else {
                error.clone()
            };
            fields.push(WebhookField {
                name: "Error".to_string(),
                value: format!("```\n{}\n```", error_display),
                inline: false,
            });
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| {
                chrono::DateTime::from_timestamp(d.as_secs() as i64, 0)
                    .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            })
            .ok()
            .flatten();

        let embed = WebhookEmbed {
            title,
            description: Some(notification.message.clone()),
            color: color.as_decimal(),
            fields,
            footer: Some(WebhookFooter {
                text: "backup-sweeper".to_string(),
            }),
            timestamp,
        };

        WebhookPayload {
            username: Some("Backup Sweeper".to_string()),
            embeds: vec![embed],
        }
    }

    /// Send the webhook
    fn send_webhook(&self, payload: &WebhookPayload) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let response = client
            .post(&self.config.webhook_url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .context("Failed to send webhook")?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 204 {
            debug!("Webhook sent successfully");
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            error!("Webhook failed with status {}: {}", status, body);
            anyhow::bail!("Webhook failed with status {}: {}", status, body)
        }
    }

    /// Check if a notification is rate-limited
    fn is_rate_limited(&self, cache_key: &str) -> Result<bool> {
        let cache = self.load_cache()?;

        if let Some(entry) = cache.entries.get(cache_key) {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();

            let rate_limit_secs = self.config.rate_limit_minutes * 60;

            if now.saturating_sub(entry.last_sent) < rate_limit_secs {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Update the rate limit cache
    fn update_cache(&self, cache_key: &str) -> Result<()> {
        let mut cache = self.load_cache()?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        cache.entries.insert(
            cache_key.to_string(),
            CacheEntry {
                last_sent: now,
                count: cache.entries.get(cache_key).map_or(1, |e| e.count + 1),
            },
        );

        // Drop entries older than 24 hours.
        let cutoff = now.saturating_sub(86400);
        cache.entries.retain(|_, v| v.last_sent > cutoff);

        self.save_cache(&cache)?;
        Ok(())
    }

    /// Load the notification cache from disk
    fn load_cache(&self) -> Result<NotificationCache> {
        if !self.cache_path.exists() {
            return Ok(NotificationCache::default());
        }

        let content =
            fs::read_to_string(&self.cache_path).context("Failed to read notification cache")?;

        serde_json::from_str(&content).context("Failed to parse notification cache")
    }

    /// Save the notification cache to disk
    fn save_cache(&self, cache: &NotificationCache) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content =
            serde_json::to_string_pretty(cache).context("Failed to serialize notification cache")?;

        fs::write(&self.cache_path, content).context("Failed to write notification cache")?;

        Ok(())
    }
}
