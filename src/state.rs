use std::sync::Arc;

use chrono::Duration;
use deadpool_postgres::Pool;

use crate::config::Config;
use crate::crypto::token::TokenCodec;
use crate::error::{AppError, Result};
use crate::middleware_layer::guard::RoutePolicy;

/// The application's state.
///
/// Built once in `main` and shared by clone; every field is either
/// reference-counted or read-only.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The application's configuration.
    pub config: Arc<Config>,
    /// Signs and verifies session tokens.
    pub tokens: Arc<TokenCodec>,
    /// Redirect rules applied by the route guard.
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// The pool connects lazily, so this only fails on invalid configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let ttl = Duration::try_days(config.session_ttl_days).ok_or_else(|| {
            AppError::Configuration(format!(
                "session lifetime of {} days is out of range",
                config.session_ttl_days
            ))
        })?;
        let tokens = TokenCodec::new(&config.session_secret, ttl)?;
        tracing::info!("✅ Session codec initialized (ttl: {} days)", config.session_ttl_days);

        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL pool initialized");

        Ok(AppState {
            db,
            config: Arc::new(config.clone()),
            tokens: Arc::new(tokens),
            policy: Arc::new(RoutePolicy::default()),
        })
    }

    /// Replaces the route policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }
}
