use chrono::{DateTime, Utc};
use serde::Serialize;

/// The user a session token was issued to, decoded from its claims.
///
/// Only exists alongside a verified token; it is never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// The user's identifier.
    pub id: String,
    /// The user's username.
    pub username: String,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: i64,
    /// The issue time of the token, in seconds since the Unix epoch.
    pub iat: i64,
}

impl User {
    /// The instant the token stops being valid.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is expired at `now`. A token is dead from its `exp` second on.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
