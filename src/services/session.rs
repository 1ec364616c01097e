use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use tower_cookies::cookie::{SameSite, time::OffsetDateTime};
use tower_cookies::{Cookie, Cookies};

use crate::{
    crypto::token::TokenCodec,
    error::{AppError, Result},
    models::session::SessionPayload,
    state::AppState,
};

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "session";

/// Keeps the session token in the `session` cookie.
///
/// The token is the whole session: nothing is stored server-side, so
/// [`SessionStore::destroy`] only makes the browser forget it.
#[derive(Clone)]
pub struct SessionStore {
    cookies: Cookies,
    tokens: Arc<TokenCodec>,
    secure: bool,
}

impl SessionStore {
    pub fn new(cookies: Cookies, tokens: Arc<TokenCodec>, secure: bool) -> Self {
        Self {
            cookies,
            tokens,
            secure,
        }
    }

    /// Issues a token for the user and stores it in the session cookie.
    ///
    /// The cookie expires at exactly the payload's `expires_at`.
    pub fn create(&self, user_id: &str, role: &str) -> Result<SessionPayload> {
        let issued = self.tokens.issue(user_id, role)?;
        let cookie = session_cookie(issued.token, issued.payload.expires_at, self.secure)?;
        self.cookies.add(cookie);

        tracing::debug!("Session cookie set for user: {}", issued.payload.user_id);
        Ok(issued.payload)
    }

    /// Returns the payload of the current session, if it is valid.
    pub fn verify(&self) -> Option<SessionPayload> {
        let token = self
            .cookies
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .unwrap_or_default();

        self.tokens.verify(&token)
    }

    /// Removes the session cookie. Safe to call any number of times.
    pub fn destroy(&self) {
        let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
        self.cookies.remove(cookie);
    }
}

impl FromRequestParts<AppState> for SessionStore {
    type Rejection = <Cookies as FromRequestParts<AppState>>::Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;
        Ok(Self::new(
            cookies,
            state.tokens.clone(),
            state.config.cookie_secure,
        ))
    }
}

/// Builds the session cookie for a signed token.
fn session_cookie(token: String, expires_at: DateTime<Utc>, secure: bool) -> Result<Cookie<'static>> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
        .map_err(|e| AppError::Internal(format!("Session expiry out of range: {e}")))?;

    Ok(Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .expires(expires)
        .build())
}
