use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user snapshot held by a session and echoed by `/session-check`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub nickname: Option<String>,
}

/// Represents a user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The user this session belongs to.
    pub user: SessionUser,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Seconds left before expiry, zero once expired.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }
}

/// A resolved session together with the token it was found under.
///
/// Inserted into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub session: Session,
}

impl AuthSession {
    pub fn user_id(&self) -> &str {
        &self.session.user.id
    }
}
