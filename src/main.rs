use std::io::{self, BufRead};

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::config::Config;
use folio::services::auth::hash_password;
use folio::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if std::env::args().nth(1).as_deref() == Some("hash-password") {
        return print_password_hash();
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Invalid configuration: {:#}", e);
            return Err(e);
        }
    };
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config)?;
    tracing::info!("✅ AppState initialized");

    let app = folio::app(state.clone());

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close();
    tracing::info!("👋 Server stopped");

    Ok(())
}

/// Reads a password from the first line of stdin and prints its Argon2id hash.
fn print_password_hash() -> anyhow::Result<()> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        anyhow::bail!("expected a password on stdin");
    }

    println!("{}", hash_password(password)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("🛑 Shutdown signal received");
}
