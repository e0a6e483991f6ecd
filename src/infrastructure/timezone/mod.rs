//! Fixed-offset timezone handles, one shared instance per hour offset.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;

/// A fixed-offset timezone with a `GMT<hours>` style name and no DST.
#[derive(Debug)]
pub struct Gmt {
    name: String,
    offset: FixedOffset,
}

impl Gmt {
    fn new(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).expect("offset within a day");
        Self {
            name: format!("GMT{}", hours),
            offset,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn hours(&self) -> i32 {
        self.offset.local_minus_utc() / 3600
    }

    /// Current time in this timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Converts epoch seconds into this timezone.
    pub fn from_timestamp(&self, secs: i64) -> Option<DateTime<FixedOffset>> {
        self.offset.timestamp_opt(secs, 0).single()
    }
}

static TIMEZONES: Lazy<Mutex<HashMap<i32, &'static Gmt>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the shared timezone handle for an integer hour offset.
///
/// The first call per offset builds the handle; later calls return the same
/// instance for the lifetime of the process. Offsets are clamped to ±23 hours.
pub fn gmt(hours: i32) -> &'static Gmt {
    let hours = hours.clamp(-23, 23);
    let mut cache = TIMEZONES.lock().expect("timezone cache lock poisoned");
    *cache
        .entry(hours)
        .or_insert_with(|| Box::leak(Box::new(Gmt::new(hours))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_offset_returns_same_instance() {
        assert!(std::ptr::eq(gmt(-3), gmt(-3)));
    }

    #[test]
    fn distinct_offsets_are_distinct_instances() {
        let west = gmt(-3);
        let east = gmt(3);
        assert!(!std::ptr::eq(west, east));
        assert_eq!(west.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(east.offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn names_follow_gmt_convention() {
        assert_eq!(gmt(-3).name(), "GMT-3");
        assert_eq!(gmt(3).name(), "GMT3");
        assert_eq!(gmt(0).name(), "GMT0");
    }

    #[test]
    fn hours_round_trip() {
        assert_eq!(gmt(-3).hours(), -3);
        assert_eq!(gmt(5).hours(), 5);
    }

    #[test]
    fn timestamp_conversion_lands_in_offset() {
        let time = gmt(-3).from_timestamp(0).expect("epoch is valid");
        assert_eq!(time.to_rfc3339(), "1969-12-31T21:00:00-03:00");
    }
}
