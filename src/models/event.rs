use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// An event as returned by the platform. List and detail responses share the
/// same shape; a few bookkeeping fields are absent from list items, hence the
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub language: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// `None` means unlimited seats
    pub capacity: Option<u32>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_by_email: Option<String>,
    #[serde(default)]
    pub available_seats: Option<u32>,
    #[serde(default)]
    pub total_enrollments: u32,
    #[serde(default)]
    pub is_past: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// True if the event has a capacity and no seats left.
    pub fn is_full(&self) -> bool {
        matches!(self.available_seats, Some(0))
    }
}

/// Payload for creating or updating an event (facilitator only).
#[derive(Debug, Clone, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub language: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// Search parameters for the seeker-facing event list. Every field is
/// optional; an empty filter lists everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub location: Option<String>,
    pub language: Option<String>,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    /// Free-text search over title and description
    pub text: Option<String>,
}

impl EventFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(ref location) = self.location {
            query.push(("location".into(), location.clone()));
        }
        if let Some(ref language) = self.language {
            query.push(("language".into(), language.clone()));
        }
        if let Some(starts_after) = self.starts_after {
            query.push((
                "starts_after".into(),
                starts_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(starts_before) = self.starts_before {
            query.push((
                "starts_before".into(),
                starts_before.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(ref text) = self.text {
            query.push(("q".into(), text.clone()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_list_item_without_detail_fields() {
        let json = r#"{
            "id": 12,
            "title": "Rust study circle",
            "description": "Weekly meetup",
            "language": "English",
            "location": "Berlin",
            "starts_at": "2026-09-01T18:00:00Z",
            "ends_at": "2026-09-01T20:00:00Z",
            "capacity": 20,
            "created_by_email": "mira@example.com",
            "available_seats": 3,
            "total_enrollments": 17,
            "is_past": false
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, 12);
        assert_eq!(event.capacity, Some(20));
        assert_eq!(event.available_seats, Some(3));
        assert!(event.created_by.is_none());
        assert!(!event.is_full());
    }

    #[test]
    fn unlimited_capacity_is_never_full() {
        let json = r#"{
            "title": "Open lecture",
            "description": "",
            "language": "German",
            "location": "Online",
            "starts_at": "2026-09-01T18:00:00Z",
            "ends_at": "2026-09-01T20:00:00Z",
            "capacity": null
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert!(event.available_seats.is_none());
        assert!(!event.is_full());
    }

    #[test]
    fn filter_builds_expected_query() {
        let filter = EventFilter {
            location: Some("Berlin".into()),
            language: None,
            starts_after: Some(Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()),
            starts_before: None,
            text: Some("rust".into()),
        };

        let query = filter.to_query();
        assert_eq!(
            query,
            vec![
                ("location".to_string(), "Berlin".to_string()),
                ("starts_after".to_string(), "2026-09-01T00:00:00Z".to_string()),
                ("q".to_string(), "rust".to_string()),
            ]
        );
    }

    #[test]
    fn empty_filter_has_no_params() {
        assert!(EventFilter::default().to_query().is_empty());
    }

    #[test]
    fn draft_omits_absent_capacity() {
        let draft = EventDraft {
            title: "t".into(),
            description: "d".into(),
            language: "English".into(),
            location: "Online".into(),
            starts_at: Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2026, 9, 1, 20, 0, 0).unwrap(),
            capacity: None,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("capacity").is_none());
    }
}
