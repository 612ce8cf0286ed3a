use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Canceled,
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::Enrolled => write!(f, "Enrolled"),
            EnrollmentStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

/// A seeker's enrollment in an event. The server denormalizes a few event
/// fields into the response so lists can render without extra round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default)]
    pub id: i64,
    pub event: i64,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default)]
    pub event_starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_location: Option<String>,
    #[serde(default)]
    pub seeker: Option<i64>,
    #[serde(default)]
    pub seeker_email: Option<String>,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Enrolled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enrollment_response() {
        let json = r#"{
            "id": 4,
            "event": 12,
            "event_title": "Rust study circle",
            "event_starts_at": "2026-09-01T18:00:00Z",
            "event_location": "Berlin",
            "seeker": 31,
            "seeker_email": "tam@example.com",
            "status": "enrolled",
            "created_at": "2026-08-20T10:00:00Z"
        }"#;

        let enrollment: Enrollment = serde_json::from_str(json).unwrap();
        assert_eq!(enrollment.event, 12);
        assert!(enrollment.is_active());
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::Canceled).unwrap(),
            r#""canceled""#
        );
        let status: EnrollmentStatus = serde_json::from_str(r#""enrolled""#).unwrap();
        assert_eq!(status, EnrollmentStatus::Enrolled);
    }
}
