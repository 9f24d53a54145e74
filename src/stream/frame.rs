//! SSE frame formatting.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// End-of-stream marker carried in the final event.
pub const SENTINEL: &str = "[DONE]";

/// Complete event line for the sentinel.
pub const SENTINEL_EVENT: &[u8] = b"data: [DONE]\n\n";

/// One timestamped unit of streamed content.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub index: u32,
    pub time: String,
}

impl Frame {
    /// Frame stamped with the current UTC instant.
    pub fn now(index: u32) -> Self {
        Self {
            index,
            time: format_timestamp(Utc::now()),
        }
    }

    /// `data: {"index":N,"time":"..."}` followed by the blank line ending the event.
    pub fn to_event(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}

/// RFC 3339 UTC timestamp with nanosecond precision and trailing zeros
/// dropped from the fraction (`2024-05-01T10:00:00.1234Z`, `...T10:00:00Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    let mut out = at.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = at.timestamp_subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

/// Current instant in the format of [`format_timestamp`].
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}
