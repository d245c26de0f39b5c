//! Deterministic timestamps
//!
//! Stores written by hand in tests use these fixed instants so file names
//! and expected replay offsets are reproducible.

use chrono::{DateTime, Duration, Utc};

/// Fixed capture time for testing (2024-01-01 00:00:00 UTC)
pub const TEST_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

/// Get the fixed base timestamp
pub fn test_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(TEST_TIMESTAMP)
        .expect("Invalid test timestamp")
        .with_timezone(&Utc)
}

/// Base timestamp shifted by `ms` milliseconds
pub fn test_at(ms: i64) -> DateTime<Utc> {
    test_now() + Duration::milliseconds(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_timestamp() {
        let ts = test_now();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 1);
    }

    #[test]
    fn test_at_offsets_in_milliseconds() {
        assert_eq!((test_at(1_500) - test_now()).num_milliseconds(), 1_500);
    }
}
