use std::borrow::Cow;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{services::session::SessionStore, state::AppState};

/// Directories the guard never looks at, including the bare directory path.
const EXCLUDED_DIRS: &[&str] = &["/static", "/assets"];

/// Exact paths the guard never looks at.
const EXCLUDED_PATHS: &[&str] = &["/favicon.ico"];

/// How a path relates to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires a valid session. Matched by prefix.
    Protected,
    /// Login surface for signed-out users. Matched exactly.
    AuthSurface,
}

/// What the guard does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    RedirectToLogin,
    RedirectToDashboard,
}

/// Ordered table of path rules evaluated by the route guard.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<(Cow<'static, str>, RouteClass)>,
    login_path: Cow<'static, str>,
    dashboard_path: Cow<'static, str>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new("/admin", "/admin/dashboard")
            .protect("/admin/dashboard")
            .auth_surface("/admin")
    }
}

impl RoutePolicy {
    /// Creates an empty policy redirecting to the given login and dashboard paths.
    pub fn new(
        login_path: impl Into<Cow<'static, str>>,
        dashboard_path: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            rules: Vec::new(),
            login_path: login_path.into(),
            dashboard_path: dashboard_path.into(),
        }
    }

    /// Adds a prefix that requires a session.
    #[must_use]
    pub fn protect(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.rules.push((prefix.into(), RouteClass::Protected));
        self
    }

    /// Adds a page signed-in users are sent away from.
    #[must_use]
    pub fn auth_surface(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.rules.push((path.into(), RouteClass::AuthSurface));
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }

    /// Returns true for paths the guard lets through without reading the session.
    pub fn is_excluded(&self, path: &str) -> bool {
        EXCLUDED_PATHS.iter().any(|excluded| *excluded == path)
            || EXCLUDED_DIRS.iter().any(|dir| {
                path.strip_prefix(dir)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
    }

    /// Classifies a path by the first rule that matches it.
    pub fn classify(&self, path: &str) -> Option<RouteClass> {
        let normalized = normalize(path);

        self.rules
            .iter()
            .find(|(pattern, class)| match class {
                RouteClass::Protected => path.starts_with(&**pattern),
                RouteClass::AuthSurface => normalized == &**pattern,
            })
            .map(|(_, class)| *class)
    }

    /// Applies the redirect table to a path and session state.
    pub fn decide(&self, path: &str, authenticated: bool) -> Decision {
        match self.classify(path) {
            Some(RouteClass::Protected) if !authenticated => Decision::RedirectToLogin,
            Some(RouteClass::AuthSurface) if authenticated && normalize(path) != self.dashboard_path => {
                Decision::RedirectToDashboard
            }
            _ => Decision::Continue,
        }
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// A middleware that redirects requests whose path and session disagree.
///
/// Any token that fails to verify counts as no session. When the request is
/// let through with a valid session, the `SessionPayload` is placed in the
/// request extensions for handlers.
pub async fn route_guard(
    State(state): State<AppState>,
    session: SessionStore,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if state.policy.is_excluded(&path) {
        return next.run(request).await;
    }

    let payload = session.verify();

    match state.policy.decide(&path, payload.is_some()) {
        Decision::RedirectToLogin => {
            tracing::debug!("🔒 No valid session for {}, redirecting to login", path);
            Redirect::temporary(state.policy.login_path()).into_response()
        }
        Decision::RedirectToDashboard => {
            tracing::debug!("🔑 Session present on {}, redirecting to dashboard", path);
            Redirect::temporary(state.policy.dashboard_path()).into_response()
        }
        Decision::Continue => {
            if let Some(payload) = payload {
                request.extensions_mut().insert(payload);
            }
            next.run(request).await
        }
    }
}
