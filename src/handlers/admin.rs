use axum::{response::Html, Extension, Json};

use crate::{
    error::{AppError, Result},
    models::session::SessionPayload,
};

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin sign in</title></head>
<body>
<form id="login">
  <input name="email" type="email" autocomplete="username" required>
  <input name="password" type="password" autocomplete="current-password" required>
  <button type="submit">Sign in</button>
</form>
<script>
document.getElementById("login").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = new FormData(event.target);
  const res = await fetch("/api/auth/login", {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ email: form.get("email"), password: form.get("password") }),
  });
  if (res.ok) window.location.assign("/admin/dashboard");
});
</script>
</body>
</html>
"#;

/// The admin sign-in page. Signed-in users never reach it; the route guard
/// sends them to the dashboard.
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// Returns the signed-in administrator's session.
///
/// The route guard guarantees a verified payload in the request extensions;
/// non-admin roles are refused here.
pub async fn dashboard(Extension(session): Extension<SessionPayload>) -> Result<Json<SessionPayload>> {
    if !session.is_admin() {
        tracing::warn!("❌ Dashboard refused for role {:?} (user {})", session.role, session.user_id);
        return Err(AppError::Unauthorized);
    }

    Ok(Json(session))
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
