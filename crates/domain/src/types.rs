//! Common data types used throughout the application

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login credentials for one configured PlayMetrics account.
///
/// Supplied once at configuration time and owned by the pipeline for its
/// whole lifetime.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role_id: String,
}

// Password must never reach log output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Transient two-token session produced by one credential exchange.
///
/// The access key is only valid together with the identity token obtained in
/// the same exchange. Sessions are never cached across fetch cycles; every
/// poll performs a full two-step login.
#[derive(Clone)]
pub struct Session {
    pub identity_token: String,
    pub access_key: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity_token", &"<redacted>")
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Raw team record from the calendar endpoint (before normalization).
///
/// Upstream payloads are partial by nature; absence of any field must not
/// fault the pipeline, so everything is optional or defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTeam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// Raw event record from the calendar endpoint (before normalization)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub details: Option<EventDetails>,
}

/// Nested detail object on a raw event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub field: Option<FieldInfo>,
    #[serde(default)]
    pub canceled_at: Option<String>,
}

/// Venue record nested inside event details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A fully derived calendar event, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub title: String,
    pub team: String,
    pub location: String,
    pub cancelled: bool,
    pub kind: String,
}

/// The complete normalized event list produced by one successful fetch cycle.
///
/// Immutable once produced; the scheduler replaces its held snapshot
/// wholesale, never partially.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub events: Vec<NormalizedEvent>,
    pub event_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot from an already ordered event list.
    pub fn new(events: Vec<NormalizedEvent>, generated_at: DateTime<Utc>) -> Self {
        let event_count = events.len();
        Self { events, event_count, generated_at }
    }

    /// Returns true when the snapshot holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
