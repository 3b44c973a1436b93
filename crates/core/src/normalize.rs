//! Event normalization
//!
//! Pure transformation from raw upstream team records into a time-windowed,
//! chronologically ordered [`Snapshot`]. Performs no I/O and never fails on
//! malformed individual records: an event missing optional fields degrades
//! per the fallback rules, and only a missing or unparseable start timestamp
//! drops that single record.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, Utc};
use matchday_domain::constants::{
    EVENT_KIND_PRACTICE, FALLBACK_KIND, FALLBACK_LOCATION, FALLBACK_TEAM_NAME, FALLBACK_TITLE,
};
use matchday_domain::{EventDetails, NormalizedEvent, RawTeam, Snapshot};
use tracing::debug;

/// Normalize raw team records into a snapshot.
///
/// Keeps every event whose start time falls inside the inclusive window
/// `[reference, reference + horizon]`. The check is on start time only; end
/// times are never used as a filter criterion. Output is sorted ascending by
/// start time with a stable sort, so events with equal starts keep their
/// team-then-upstream input order.
pub fn normalize(teams: &[RawTeam], reference: DateTime<Utc>, horizon: Duration) -> Snapshot {
    let window_end = reference + horizon;
    let mut events = Vec::new();

    for team in teams {
        let team_name =
            team.name.clone().unwrap_or_else(|| FALLBACK_TEAM_NAME.to_string());

        for raw in &team.events {
            let Some(start_raw) = raw.start_datetime.as_deref() else {
                continue;
            };
            let Some(start) = parse_timestamp(start_raw) else {
                debug!(team = %team_name, timestamp = start_raw, "dropping event with unparseable start");
                continue;
            };

            if start < reference || start > window_end {
                continue;
            }

            let end = raw.end_datetime.as_deref().and_then(parse_timestamp);
            let details = raw.details.clone().unwrap_or_default();
            let kind = raw.kind.clone().unwrap_or_else(|| FALLBACK_KIND.to_string());

            events.push(NormalizedEvent {
                start,
                end,
                title: raw.summary.clone().unwrap_or_else(|| FALLBACK_TITLE.to_string()),
                team: team_name.clone(),
                location: derive_location(raw.kind.as_deref(), &details),
                cancelled: details.canceled_at.is_some(),
                kind,
            });
        }
    }

    // sort_by_key is stable; ties keep input order
    events.sort_by_key(|event| event.start);

    Snapshot::new(events, reference)
}

/// Parse an upstream timestamp into a UTC instant.
///
/// Zone-naive values are upstream wall-clock times in the local system
/// timezone. During a DST fold the earlier instant wins; a nonexistent local
/// time is treated like an unparseable timestamp.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;

    match naive.and_local_timezone(Local) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Resolve the display location with an explicit ordered fallback chain.
///
/// Practices name their venue in the free-text description; every other kind
/// uses the location field. Either way the venue display name is the second
/// choice and `"TBD"` the last. Empty strings fall through the chain the
/// same way missing fields do.
fn derive_location(kind: Option<&str>, details: &EventDetails) -> String {
    let primary = if kind == Some(EVENT_KIND_PRACTICE) {
        details.description.as_deref()
    } else {
        details.location.as_deref()
    };

    non_empty(primary)
        .or_else(|| non_empty(details.field.as_ref().and_then(|f| f.display_name.as_deref())))
        .unwrap_or(FALLBACK_LOCATION)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use matchday_domain::{FieldInfo, RawEvent};

    use super::*;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn event(start: &str) -> RawEvent {
        RawEvent { start_datetime: Some(start.to_string()), ..RawEvent::default() }
    }

    fn team(name: &str, events: Vec<RawEvent>) -> RawTeam {
        RawTeam { name: Some(name.to_string()), events }
    }

    #[test]
    fn window_filter_is_inclusive_on_both_ends() {
        let teams = vec![team(
            "U10 Red",
            vec![
                event("2024-05-01T11:59:59Z"),      // just before the window
                event("2024-05-01T12:00:00Z"),      // exactly at the reference
                event("2024-05-05T09:00:00Z"),      // inside
                event("2024-05-08T12:00:00Z"),      // exactly at the horizon
                event("2024-05-08T12:00:01Z"),      // just past the horizon
            ],
        )];

        let snapshot = normalize(&teams, reference(), Duration::days(7));

        assert_eq!(snapshot.event_count, 3);
        for evt in &snapshot.events {
            assert!(evt.start >= reference());
            assert!(evt.start <= reference() + Duration::days(7));
        }
    }

    #[test]
    fn events_without_start_are_dropped_not_fatal() {
        let teams = vec![team(
            "U10 Red",
            vec![
                RawEvent::default(),
                event("not-a-timestamp"),
                event("2024-05-02T10:00:00Z"),
            ],
        )];

        let snapshot = normalize(&teams, reference(), Duration::days(7));
        assert_eq!(snapshot.event_count, 1);
    }

    #[test]
    fn missing_optional_fields_degrade_to_fallbacks() {
        let teams = vec![RawTeam {
            name: None,
            events: vec![event("2024-05-02T10:00:00Z")],
        }];

        let snapshot = normalize(&teams, reference(), Duration::days(7));
        let evt = &snapshot.events[0];

        assert_eq!(evt.title, "Event");
        assert_eq!(evt.team, "Unknown Team");
        assert_eq!(evt.location, "TBD");
        assert_eq!(evt.kind, "Event");
        assert!(evt.end.is_none());
        assert!(!evt.cancelled);
    }

    #[test]
    fn practice_prefers_description_for_location() {
        let mut raw = event("2024-05-03T18:00:00Z");
        raw.kind = Some("Practice".to_string());
        raw.summary = Some("Team Practice".to_string());
        raw.details = Some(EventDetails {
            description: Some("Field 3".to_string()),
            location: Some("Clubhouse".to_string()),
            field: Some(FieldInfo { display_name: Some("Main Stadium".to_string()) }),
            canceled_at: None,
        });

        let snapshot = normalize(&[team("U10 Red", vec![raw])], reference(), Duration::days(7));
        let evt = &snapshot.events[0];

        assert_eq!(evt.location, "Field 3");
        assert!(!evt.cancelled);
        assert_eq!(evt.kind, "Practice");
    }

    #[test]
    fn cancelled_game_falls_back_to_field_display_name() {
        let mut raw = event("2024-05-03T18:00:00Z");
        raw.kind = Some("Game".to_string());
        raw.details = Some(EventDetails {
            description: None,
            location: None,
            field: Some(FieldInfo { display_name: Some("Main Stadium".to_string()) }),
            canceled_at: Some("2024-01-01T00:00:00Z".to_string()),
        });

        let snapshot = normalize(&[team("U10 Red", vec![raw])], reference(), Duration::days(7));
        let evt = &snapshot.events[0];

        assert_eq!(evt.location, "Main Stadium");
        assert!(evt.cancelled);
    }

    #[test]
    fn empty_strings_fall_through_the_location_chain() {
        let mut raw = event("2024-05-03T18:00:00Z");
        raw.kind = Some("Practice".to_string());
        raw.details = Some(EventDetails {
            description: Some(String::new()),
            location: None,
            field: Some(FieldInfo { display_name: Some("Field 7".to_string()) }),
            canceled_at: None,
        });

        let snapshot = normalize(&[team("U10 Red", vec![raw])], reference(), Duration::days(7));
        assert_eq!(snapshot.events[0].location, "Field 7");
    }

    #[test]
    fn output_is_sorted_across_teams_and_ties_keep_input_order() {
        let mut early = event("2024-05-02T09:00:00Z");
        early.summary = Some("early".to_string());
        let mut late = event("2024-05-06T09:00:00Z");
        late.summary = Some("late".to_string());
        let mut tie_a = event("2024-05-04T09:00:00Z");
        tie_a.summary = Some("tie-a".to_string());
        let mut tie_b = event("2024-05-04T09:00:00Z");
        tie_b.summary = Some("tie-b".to_string());

        let teams = vec![
            team("Alpha", vec![late, tie_a]),
            team("Beta", vec![tie_b, early]),
        ];

        let snapshot = normalize(&teams, reference(), Duration::days(7));
        let titles: Vec<&str> = snapshot.events.iter().map(|e| e.title.as_str()).collect();

        assert_eq!(titles, vec!["early", "tie-a", "tie-b", "late"]);
        assert!(snapshot
            .events
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start));
    }

    #[test]
    fn offset_timestamps_are_compared_as_instants() {
        // 10:00 -04:00 is 14:00Z; both spellings land on the same instant
        let teams = vec![team(
            "U10 Red",
            vec![event("2024-05-02T10:00:00-04:00"), event("2024-05-02T14:00:00Z")],
        )];

        let snapshot = normalize(&teams, reference(), Duration::days(7));
        assert_eq!(snapshot.event_count, 2);
        assert_eq!(snapshot.events[0].start, snapshot.events[1].start);
    }

    #[test]
    fn naive_timestamps_are_interpreted_as_local_time() {
        let naive = NaiveDateTime::parse_from_str("2024-05-02T10:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap();
        let expected = match naive.and_local_timezone(Local) {
            LocalResult::Single(local) => local.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => unreachable!("test instant exists in local time"),
        };

        // Make the window wide enough to cover any local offset
        let snapshot = normalize(
            &[team("U10 Red", vec![event("2024-05-02T10:00:00")])],
            reference() - Duration::days(2),
            Duration::days(7),
        );

        assert_eq!(snapshot.events[0].start, expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let payload = serde_json::json!([{
            "name": "U10 Red",
            "events": [
                {"type": "Game", "summary": "vs Blue", "start_datetime": "2024-05-02T10:00:00Z",
                 "end_datetime": "2024-05-02T11:30:00Z",
                 "details": {"location": "City Park"}},
                {"type": "Practice", "start_datetime": "2024-05-03T18:00:00Z",
                 "details": {"description": "Field 3"}}
            ]
        }]);
        let teams: Vec<RawTeam> = serde_json::from_value(payload).unwrap();

        let first = normalize(&teams, reference(), Duration::days(7));
        let second = normalize(&teams, reference(), Duration::days(7));

        assert_eq!(first, second);
        assert_eq!(first.generated_at, reference());
    }

    #[test]
    fn unparseable_end_is_dropped_while_the_event_survives() {
        let mut raw = event("2024-05-02T10:00:00Z");
        raw.end_datetime = Some("garbage".to_string());

        let snapshot = normalize(&[team("U10 Red", vec![raw])], reference(), Duration::days(7));
        assert_eq!(snapshot.event_count, 1);
        assert!(snapshot.events[0].end.is_none());
    }
}
