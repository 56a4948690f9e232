/// Access token claims
///
/// Registered JWT claims only (RFC 7519): the subject is the user id in
/// decimal form.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::store::UserId;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    pub fn new(user_id: UserId, ttl: Duration, issuer: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: issuer.to_string(),
        }
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse::<UserId>().map_err(|_| AuthError::Malformed)
    }
}
