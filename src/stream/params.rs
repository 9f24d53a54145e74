//! Per-request tuning for SSE responses.
//!
//! Query values are untrusted. Anything malformed degrades to a default and
//! anything too large is clamped, so a request never fails on its parameters.

use std::time::Duration;

/// Frames emitted when `chunks` is missing or unusable.
pub const DEFAULT_CHUNK_COUNT: u32 = 3;
/// Upper bound on frames per stream.
pub const MAX_CHUNK_COUNT: u32 = 100;
/// Inter-frame delay when `delayMs` is missing or unusable.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(300);
/// Upper bound on the inter-frame delay.
pub const MAX_CHUNK_DELAY: Duration = Duration::from_millis(10_000);

/// Raw query parameters of `/gzip/sse`, kept as strings so that garbage
/// reaches the resolver instead of being rejected by the extractor.
#[derive(Debug, Default, Clone)]
pub struct StreamQuery {
    pub chunks: Option<String>,
    pub delay_ms: Option<String>,
}

impl StreamQuery {
    /// Pick the first `chunks` and `delayMs` values out of decoded query pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "chunks" => &mut query.chunks,
                "delayMs" => &mut query.delay_ms,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// Resolved shape of one SSE response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseConfig {
    pub chunk_count: u32,
    pub chunk_delay: Duration,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            chunk_count: DEFAULT_CHUNK_COUNT,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }
}

impl ResponseConfig {
    pub fn from_query(query: &StreamQuery) -> Self {
        Self {
            chunk_count: resolve_chunk_count(query.chunks.as_deref()),
            chunk_delay: resolve_chunk_delay(query.delay_ms.as_deref()),
        }
    }
}

/// Resolve `chunks`: non-positive or non-numeric falls back, above the cap clamps.
pub fn resolve_chunk_count(raw: Option<&str>) -> u32 {
    match parse_integer(raw) {
        Some(value) if value <= 0 => DEFAULT_CHUNK_COUNT,
        Some(value) if value > i64::from(MAX_CHUNK_COUNT) => MAX_CHUNK_COUNT,
        Some(value) => value as u32,
        None => DEFAULT_CHUNK_COUNT,
    }
}

/// Resolve `delayMs`: negative or non-numeric falls back, above the cap clamps.
pub fn resolve_chunk_delay(raw: Option<&str>) -> Duration {
    let max_ms = MAX_CHUNK_DELAY.as_millis() as i64;
    match parse_integer(raw) {
        Some(value) if value < 0 => DEFAULT_CHUNK_DELAY,
        Some(value) => Duration::from_millis(value.min(max_ms) as u64),
        None => DEFAULT_CHUNK_DELAY,
    }
}

fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_count_fallbacks() {
        for raw in [None, Some(""), Some("  "), Some("0"), Some("-5"), Some("abc"), Some("2.5")] {
            assert_eq!(resolve_chunk_count(raw), 3, "input {raw:?}");
        }
    }

    #[test]
    fn chunk_count_clamps_and_trims() {
        assert_eq!(resolve_chunk_count(Some("500")), 100);
        assert_eq!(resolve_chunk_count(Some("100")), 100);
        assert_eq!(resolve_chunk_count(Some(" 7 ")), 7);
        assert_eq!(resolve_chunk_count(Some("+2")), 2);
        assert_eq!(resolve_chunk_count(Some("1")), 1);
    }

    #[test]
    fn chunk_count_overflow_is_non_numeric() {
        assert_eq!(resolve_chunk_count(Some("99999999999999999999999")), 3);
    }

    #[test]
    fn chunk_delay_fallbacks() {
        for raw in [None, Some(""), Some("-1"), Some("soon"), Some("1e3")] {
            assert_eq!(resolve_chunk_delay(raw), Duration::from_millis(300), "input {raw:?}");
        }
    }

    #[test]
    fn chunk_delay_clamps() {
        assert_eq!(resolve_chunk_delay(Some("0")), Duration::ZERO);
        assert_eq!(resolve_chunk_delay(Some("999999")), Duration::from_millis(10_000));
        assert_eq!(resolve_chunk_delay(Some("10000")), Duration::from_millis(10_000));
        assert_eq!(resolve_chunk_delay(Some(" 25")), Duration::from_millis(25));
    }

    #[test]
    fn from_query_resolves_both() {
        let query = StreamQuery {
            chunks: Some("2".into()),
            delay_ms: Some("nope".into()),
        };
        assert_eq!(
            ResponseConfig::from_query(&query),
            ResponseConfig {
                chunk_count: 2,
                chunk_delay: DEFAULT_CHUNK_DELAY,
            }
        );
        assert_eq!(ResponseConfig::from_query(&StreamQuery::default()), ResponseConfig::default());
    }

    #[test]
    fn first_query_value_wins() {
        let query = StreamQuery::from_pairs([
            ("delayMs", "5"),
            ("other", "x"),
            ("chunks", "4"),
            ("chunks", "9"),
        ]);
        assert_eq!(query.chunks.as_deref(), Some("4"));
        assert_eq!(query.delay_ms.as_deref(), Some("5"));
    }
}
