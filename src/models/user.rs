use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. Facilitators create and run events; seekers enroll in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Facilitator,
    Seeker,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Facilitator => write!(f, "Facilitator"),
            Role::Seeker => write!(f, "Seeker"),
        }
    }
}

/// The signed-in user as returned by `GET /auth/profile/`. Held in memory
/// only; never cached beyond the current application lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn is_facilitator(&self) -> bool {
        self.role == Role::Facilitator
    }

    pub fn is_seeker(&self) -> bool {
        self.role == Role::Seeker
    }
}
