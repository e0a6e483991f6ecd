//! Upcoming event list formatting.

use chrono::Timelike;

use crate::domain::entities::Event;

/// Formats events as markdown lines `[name](link): dd/mm HHh[MM]`.
///
/// Minutes only appear when the event does not start on the hour.
pub fn format_events(events: &[Event]) -> String {
    events
        .iter()
        .map(|event| {
            let time = if event.time.minute() == 0 {
                event.time.format("%d/%m %Hh").to_string()
            } else {
                event.time.format("%d/%m %Hh%M").to_string()
            };
            format!("[{}]({}): {}", event.name, event.link, time)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
