//! Display formatting helpers
//!
//! Pure derivations of the strings the presentation layer shows: one line
//! per event and a short summary of the current snapshot. Times are rendered
//! in the local system timezone.

use chrono::Local;
use matchday_domain::{NormalizedEvent, Snapshot};

/// Render one event as a single display line.
///
/// `Wed May 1, 6:30 PM to 8:00 PM | Team Practice (U10 Red) @ Field 3`
pub fn event_line(event: &NormalizedEvent) -> String {
    let start = event.start.with_timezone(&Local).format("%a %b %-d, %-I:%M %p");

    let time = match event.end {
        Some(end) => {
            format!("{} to {}", start, end.with_timezone(&Local).format("%-I:%M %p"))
        }
        None => start.to_string(),
    };

    let cancel_tag = if event.cancelled { " ❌ CANCELLED" } else { "" };

    format!("{} | {} ({}) @ {}{}", time, event.title, event.team, event.location, cancel_tag)
}

/// Render every event in the snapshot, preserving its order.
pub fn event_lines(snapshot: &Snapshot) -> Vec<String> {
    snapshot.events.iter().map(event_line).collect()
}

/// Short state summary for the consumer.
pub fn snapshot_summary(snapshot: Option<&Snapshot>, future_days: u32) -> String {
    match snapshot {
        None => "No data".to_string(),
        Some(snap) if snap.is_empty() => {
            format!("No events in next {} days", future_days)
        }
        Some(snap) => {
            let plural = if snap.event_count == 1 { "" } else { "s" };
            format!("{} event{}", snap.event_count, plural)
        }
    }
}
