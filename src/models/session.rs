use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role tag carried by administrators.
pub const ADMIN_ROLE: &str = "admin";

/// The identity carried inside a signed session token.
///
/// A payload is only ever handed out by the token codec after the signature
/// verified and `expires_at` was still in the future. There is no revocation
/// identifier: a leaked token stays valid until it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// The ID of the authenticated principal.
    pub user_id: String,
    /// Coarse authorization tag, e.g. `admin` or `user`.
    pub role: String,
    /// The instant the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl SessionPayload {
    /// Returns true if the session belongs to an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// Returns true if the session is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let payload = SessionPayload {
            user_id: "1".to_string(),
            role: ADMIN_ROLE.to_string(),
            expires_at: now,
        };

        assert!(payload.is_expired_at(now));
        assert!(!payload.is_expired_at(now - Duration::seconds(1)));
        assert!(payload.is_admin());
    }
}
