use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MIN_SECRET_LENGTH;
use crate::error::{AppError, Result};
use crate::models::session::SessionPayload;

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a compact JWS, or the claims do not deserialize.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not verify under the current key.
    #[error("token signature does not verify")]
    BadSignature,
    /// The token is at or past its expiry.
    #[error("token has expired")]
    Expired,
}

/// A freshly signed token and the payload it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub payload: SessionPayload,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
    role: String,
    #[serde(rename = "expiresAt")]
    expires_at: DateTime<Utc>,
    iat: i64,
    exp: i64,
}

/// Signs and verifies HS256 session tokens.
///
/// Built once at startup from the configured secret and shared read-only
/// between requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec from the signing secret and the session lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes or the lifetime is not positive.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Configuration(format!(
                "session secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        if ttl <= Duration::zero() {
            return Err(AppError::Configuration(
                "session lifetime must be positive".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Returns the lifetime of issued sessions.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a new session for `user_id` expiring one lifetime from now.
    pub fn issue(&self, user_id: &str, role: &str) -> Result<IssuedToken> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Signs a session as if it had been issued at `issued_at`.
    ///
    /// The expiry is truncated to whole seconds so the `exp` claim, the
    /// payload and the cookie all agree on the same instant.
    pub fn issue_at(&self, user_id: &str, role: &str, issued_at: DateTime<Utc>) -> Result<IssuedToken> {
        let issued_at = issued_at.trunc_subsecs(0);
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            AppError::Internal(format!("Session expiry overflows: {issued_at} + {}", self.ttl))
        })?;

        let claims = Claims {
            user_id: user_id.to_string(),
            role: role.to_string(),
            expires_at,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Session token signing failed: {e}")))?;

        Ok(IssuedToken {
            token,
            payload: SessionPayload {
                user_id: claims.user_id,
                role: claims.role,
                expires_at,
            },
        })
    }

    /// Verifies signature and expiry together and returns the payload.
    pub fn decode(&self, token: &str) -> std::result::Result<SessionPayload, TokenError> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        let claims = token_data.claims;
        let payload = SessionPayload {
            user_id: claims.user_id,
            role: claims.role,
            expires_at: claims.expires_at,
        };

        if payload.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }

    /// Returns the payload of a valid token, or `None` for anything else.
    ///
    /// Rejections are logged at debug level only; callers treat `None` as
    /// "not signed in".
    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        if token.is_empty() {
            return None;
        }

        match self.decode(token) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                None
            }
        }
    }
}
