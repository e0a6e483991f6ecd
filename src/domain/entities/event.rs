use chrono::{DateTime, FixedOffset};

/// An upcoming community event, already converted to the community timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub link: String,
    pub time: DateTime<FixedOffset>,
}
