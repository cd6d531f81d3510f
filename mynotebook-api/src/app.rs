/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use mynotebook_api::{app::{build_mailer, build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = build_mailer(&config.mail)?;
/// let app = build_router(AppState::new(pool, config, mailer));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, MailConfig},
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use mynotebook_shared::{
    auth::middleware::{authenticate, AUTH_TOKEN_HEADER},
    mail::{http::HttpMailer, LogMailer, MailError, Mailer},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outgoing mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of newly issued session tokens
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.config.jwt.expiration_hours)
    }

    /// Lifetime of newly issued password-reset tokens
    pub fn reset_token_ttl(&self) -> Duration {
        Duration::minutes(self.config.links.reset_token_ttl_minutes)
    }
}

/// Picks the mail transport from configuration
///
/// With both `MAIL_API_URL` and `MAIL_API_KEY` set, mail goes out over HTTP;
/// otherwise messages are only logged.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match (&config.api_url, &config.api_key) {
        (Some(url), Some(key)) => {
            let mailer = HttpMailer::new(url, key, &config.from)?;
            tracing::info!(endpoint = mailer.endpoint(), "Mail delivery over HTTP enabled");
            Ok(Arc::new(mailer))
        }
        (Some(_), None) | (None, Some(_)) => Err(MailError::Config(
            "MAIL_API_URL and MAIL_API_KEY must be set together".to_string(),
        )),
        (None, None) => {
            tracing::warn!("MAIL_API_URL not set, outgoing mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health
/// └── /auth/
///     ├── POST /createuser
///     ├── POST /login
///     ├── POST|GET /getuser          (session required)
///     └── /user/
///         ├── GET  /verify-email?token=...
///         ├── POST /reset-password
///         └── POST /newpassword
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Session authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Session required
    let session_routes = Router::new()
        .route(
            "/getuser",
            post(routes::auth::get_user).get(routes::auth::get_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = Router::new()
        .route("/createuser", post(routes::auth::create_user))
        .route("/login", post(routes::auth::login))
        .route("/user/verify-email", get(routes::account::verify_email))
        .route("/user/reset-password", post(routes::account::request_password_reset))
        .route("/user/newpassword", post(routes::account::apply_new_password))
        .merge(session_routes);

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(AUTH_TOKEN_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Session authentication layer
///
/// Validates the session token and injects `AuthContext` into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(api_url: Option<&str>, api_key: Option<&str>) -> MailConfig {
        MailConfig {
            api_url: api_url.map(String::from),
            api_key: api_key.map(String::from),
            from: "My Notebook <noreply@example.com>".to_string(),
        }
    }

    #[test]
    fn test_build_mailer_without_api_logs() {
        assert!(build_mailer(&mail_config(None, None)).is_ok());
    }

    #[test]
    fn test_build_mailer_http() {
        let config = mail_config(Some("https://api.resend.com/emails"), Some("re_123"));
        assert!(build_mailer(&config).is_ok());
    }

    #[test]
    fn test_build_mailer_half_configured() {
        assert!(build_mailer(&mail_config(Some("https://api.resend.com/emails"), None)).is_err());
        assert!(build_mailer(&mail_config(None, Some("re_123"))).is_err());
    }
}
