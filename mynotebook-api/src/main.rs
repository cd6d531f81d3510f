//! # mynotebook API Server
//!
//! Account service for the notebook app: registration, login, email
//! verification and password reset over JSON/HTTP.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/mynotebook \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p mynotebook-api
//! ```

use anyhow::Context;
use mynotebook_api::{
    app::{build_mailer, build_router, AppState},
    config::Config,
};
use mynotebook_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(config.api.production);

    tracing::info!(
        "mynotebook API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    ensure_database_exists(&config.database.url)
        .await
        .context("failed to create database")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await
    .context("failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let mailer = build_mailer(&config.mail).context("invalid mail configuration")?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, mailer));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mynotebook_api=debug,mynotebook_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
