//! JWT Claims

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Registered claims carried by both tokens
///
/// `sub` is the decimal user id; `iat`/`exp` are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: UserId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Expired when `exp` is not strictly after `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Parse the subject as a positive user id
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<i64>()
            .ok()
            .and_then(UserId::positive)
            .ok_or(AuthError::MalformedToken)
    }
}
