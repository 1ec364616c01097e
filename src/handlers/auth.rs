use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::Result,
    services::{auth as auth_service, session::SessionStore},
    state::AppState,
    validation::auth::*,
};

/// The request payload for signing in.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Handles sign-in: checks credentials and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    session: SessionStore,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt: {:?}", payload);
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let user = auth_service::authenticate_user(&state.db, &payload.email, &payload.password).await?;
    let issued = session.create(&user.id.to_string(), &user.role)?;

    tracing::info!("✅ User logged in: {} (session until {})", user.id, issued.expires_at);

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        role: Some(issued.role),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles sign-out by forgetting the session cookie.
///
/// The token itself stays valid until it expires; there is no server-side
/// record to revoke.
pub async fn logout(session: SessionStore) -> Result<Response> {
    match session.verify() {
        Some(payload) => tracing::info!("👋 Logout for user: {}", payload.user_id),
        None => tracing::debug!("👋 Logout without a valid session"),
    }

    session.destroy();

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
        role: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
