//! Tiered retention categorization
//!
//! Partitions timestamped backups into keep/delete sets:
//! - This week and last week: keep everything
//! - This month and last month: keep one backup per day (the newest)
//! - Older: keep one backup per month (the newest)
//!
//! Pure computation over in-memory records. The current time is injected so
//! the window boundaries are reproducible in tests.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;

/// One stored backup artifact: an opaque key plus the timestamp extracted
/// from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    pub key: String,
    pub timestamp: NaiveDateTime,
}

impl BackupRecord {
    pub fn new(key: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            key: key.into(),
            timestamp,
        }
    }
}

/// Keep/delete classification for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Keep,
    Delete,
}

/// Result of categorizing a set of records: a partition of the input.
///
/// Both lists are ordered newest-first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionPlan {
    pub keep: Vec<BackupRecord>,
    pub delete: Vec<BackupRecord>,
}

impl RetentionPlan {
    pub fn total(&self) -> usize {
        self.keep.len() + self.delete.len()
    }

    /// Disposition of a key within this plan, if the key is part of it.
    pub fn disposition_of(&self, key: &str) -> Option<Disposition> {
        if self.keep.iter().any(|r| r.key == key) {
            Some(Disposition::Keep)
        } else if self.delete.iter().any(|r| r.key == key) {
            Some(Disposition::Delete)
        } else {
            None
        }
    }
}

/// Categorize records against the retention policy.
///
/// Records are sorted newest-first internally, so the per-day and per-month
/// dedup always keeps the most recent backup of each bucket regardless of
/// input order. Boundary instants land in the more lenient tier (`>=`).
pub fn categorize(mut records: Vec<BackupRecord>, now: NaiveDateTime) -> RetentionPlan {
    let start_of_last_week = start_of_week(now - Duration::days(7));
    let start_of_last_month = start_of_previous_month(now);

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut kept_days: HashSet<NaiveDate> = HashSet::new();
    let mut kept_months: HashSet<(i32, u32)> = HashSet::new();

    let mut plan = RetentionPlan::default();

    for record in records {
        let ts = record.timestamp;

        let disposition = if ts >= start_of_last_week {
            Disposition::Keep
        } else if ts >= start_of_last_month {
            // One per calendar day; first seen is the newest of that day.
            if kept_days.insert(ts.date()) {
                Disposition::Keep
            } else {
                Disposition::Delete
            }
        } else {
            // One per calendar month.
            if kept_months.insert((ts.year(), ts.month())) {
                Disposition::Keep
            } else {
                Disposition::Delete
            }
        };

        match disposition {
            Disposition::Keep => plan.keep.push(record),
            Disposition::Delete => plan.delete.push(record),
        }
    }

    plan
}

/// Monday 00:00:00 of the week containing `t`. Weeks start on Monday.
pub fn start_of_week(t: NaiveDateTime) -> NaiveDateTime {
    let days_from_monday = t.date().weekday().num_days_from_monday() as i64;
    let monday = t.date() - Duration::days(days_from_monday);
    monday
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
}

/// First day of the calendar month before `t`'s month, at 00:00:00.
///
/// Calendar arithmetic, not day-count arithmetic: the previous month of any
/// day in March is February, even on March 31.
pub fn start_of_previous_month(t: NaiveDateTime) -> NaiveDateTime {
    let (year, month) = if t.month() == 1 {
        (t.year() - 1, 12)
    } else {
        (t.year(), t.month() - 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .expect("first of month is always valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
}
