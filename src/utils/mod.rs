pub mod locker;
pub mod timestamp;

// Re-export commonly used helpers
#[allow(unused_imports)]
pub use timestamp::{extract_timestamp, parse_datetime, DEFAULT_DATETIME_PATTERN};
