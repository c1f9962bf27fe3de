use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Discord epoch: 2015-01-01T00:00:00Z
const EPOCH: u64 = 1_420_070_400_000;

/// Millisecond unix timestamp encoded in a snowflake ID.
pub fn timestamp_of(id: &str) -> Option<u64> {
    let num: u64 = id.parse().ok()?;
    Some((num >> 22) + EPOCH)
}

/// Creation time of the entity behind a snowflake ID.
pub fn created_at(id: &str) -> Option<SystemTime> {
    timestamp_of(id).map(|ms| UNIX_EPOCH + Duration::from_millis(ms))
}
