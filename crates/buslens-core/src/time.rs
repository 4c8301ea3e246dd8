//! Timestamp parsing for latency annotation
//!
//! Capture timestamps are opaque strings throughout the engine. The one
//! exception is seed-to-key latency annotation, which needs duration
//! arithmetic; the common capture format is `HH:MM:SS.mmm`, and parse
//! failure degrades silently to `None` ("N/A" at render time).

use chrono::NaiveTime;

/// Parse an `HH:MM:SS.mmm` capture timestamp.
pub fn parse_timestamp(ts: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(ts.trim(), "%H:%M:%S%.3f").ok()
}

/// Elapsed milliseconds from `from` to `to`.
///
/// `None` when either timestamp does not parse or when `to` precedes
/// `from` (a midnight wrap or an out-of-order capture).
pub fn elapsed_ms(from: &str, to: &str) -> Option<i64> {
    let from = parse_timestamp(from)?;
    let to = parse_timestamp(to)?;
    let delta = (to - from).num_milliseconds();
    (delta >= 0).then_some(delta)
}
