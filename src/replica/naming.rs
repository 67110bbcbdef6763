use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Error, Result};

/// `now` rendered with `format` in the zone `utc_offset_minutes` from UTC
pub fn format_timestamp(now: DateTime<Utc>, utc_offset_minutes: i32, format: &str) -> Result<String> {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .ok_or_else(|| Error::Config(format!("Invalid UTC offset: {} minutes", utc_offset_minutes)))?;
    Ok(now.with_timezone(&offset).format(format).to_string())
}

/// `{prefix}{id} - {timestamp}`
pub fn replica_title(prefix: &str, id: &str, timestamp: &str) -> String {
    format!("{}{} - {}", prefix, id, timestamp)
}
