use chrono::{DateTime, TimeZone, Utc};

use crate::api::UserProfile;

/// A persisted login: the profile plus when it was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub profile: UserProfile,
    pub saved_at: i64,
}

impl StoredSession {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            saved_at: Utc::now().timestamp(),
        }
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.saved_at, 0).single()
    }
}
