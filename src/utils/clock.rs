//! Wall-clock helpers
//!
//! Window and TTL math throughout the gateway works on epoch milliseconds.
//! Time-sensitive code paths take an explicit `now_ms` internally so tests
//! can drive the clock without sleeping.

/// Current wall-clock time as epoch milliseconds.
pub fn epoch_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Current wall-clock time as signed epoch milliseconds.
///
/// Signed variant for freshness-window arithmetic where a client-supplied
/// timestamp may lie ahead of the server clock.
pub fn epoch_ms_i64() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
