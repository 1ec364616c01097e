use std::env;
use std::fmt;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Minimum length of the session signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default lifetime of an issued session in days.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Longest session lifetime accepted from configuration, in days.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// The secret the session signing key is derived from.
    pub session_secret: Zeroizing<Vec<u8>>,
    /// The lifetime of a session in days.
    pub session_ttl_days: i64,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("static_dir", &self.static_dir)
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl_days", &self.session_ttl_days)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl Config {
    /// Creates a configuration with defaults for everything but the database
    /// and the signing secret.
    ///
    /// # Errors
    ///
    /// Fails when the secret is empty or shorter than [`MIN_SECRET_LENGTH`].
    pub fn new(database_url: impl Into<String>, session_secret: &str) -> Result<Self> {
        Ok(Self {
            database_url: database_url.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: "public".to_string(),
            session_secret: parse_secret(session_secret)?,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            cookie_secure: true,
        })
    }

    /// Creates a new `Config` from environment variables.
    ///
    /// A missing `SESSION_SECRET` is an error here so the process refuses to
    /// start instead of serving requests it can never authenticate.
    pub fn from_env() -> Result<Self> {
        let secret = Zeroizing::new(
            env::var("SESSION_SECRET")
                .context("SESSION_SECRET must be set (generate with: openssl rand -base64 48)")?,
        );
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let mut config = Self::new(database_url, &secret)?;

        if let Ok(addr) = env::var("BIND_ADDR") {
            config.bind_addr = addr.parse().context("Invalid BIND_ADDR")?;
        }

        if let Ok(dir) = env::var("STATIC_DIR") {
            config.static_dir = dir;
        }

        if let Ok(days) = env::var("SESSION_TTL_DAYS") {
            config = config.with_session_ttl_days(days.parse().context("Invalid SESSION_TTL_DAYS")?)?;
        }

        if let Ok(secure) = env::var("SESSION_COOKIE_SECURE") {
            config.cookie_secure = parse_flag(&secure).context("Invalid SESSION_COOKIE_SECURE")?;
        }

        Ok(config)
    }

    /// Overrides the session lifetime.
    pub fn with_session_ttl_days(mut self, days: i64) -> Result<Self> {
        if days <= 0 {
            anyhow::bail!("SESSION_TTL_DAYS must be positive, got {days}");
        }

        if days > MAX_SESSION_TTL_DAYS {
            anyhow::bail!("SESSION_TTL_DAYS must be at most {MAX_SESSION_TTL_DAYS}, got {days}");
        }

        self.session_ttl_days = days;
        Ok(self)
    }

    /// Overrides the `Secure` cookie attribute.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}

fn parse_secret(raw: &str) -> Result<Zeroizing<Vec<u8>>> {
    let secret = raw.trim();

    if secret.is_empty() {
        anyhow::bail!("SESSION_SECRET must not be empty");
    }

    if secret.len() < MIN_SECRET_LENGTH {
        anyhow::bail!(
            "SESSION_SECRET must be at least {MIN_SECRET_LENGTH} bytes, got {}",
            secret.len()
        );
    }

    Ok(Zeroizing::new(secret.as_bytes().to_vec()))
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
