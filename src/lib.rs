//! Session and route protection for the portfolio admin panel.
//!
//! Sessions are HS256 tokens kept in a `session` cookie; there is no
//! server-side session table. [`middleware_layer::guard::route_guard`] runs
//! on every request and redirects between the sign-in page and the
//! dashboard based on whether the cookie verifies.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod db;
pub mod error;
pub mod state;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod session;
}

pub mod handlers {
    pub mod admin;
    pub mod auth;
}

pub mod middleware_layer {
    pub mod guard;
}

pub mod validation {
    pub mod auth;
}

use state::AppState;

/// Builds the application router with the route guard in front of every route.
pub fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout));

    let admin_routes = Router::new()
        .route("/admin", get(handlers::admin::login_page))
        .route("/admin/dashboard", get(handlers::admin::dashboard));

    Router::new()
        .merge(auth_routes)
        .merge(admin_routes)
        .route("/health", get(handlers::admin::health))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::guard::route_guard,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
