/// Configuration management for the API server
///
/// Configuration is read from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `APP_ENV`: `production` enables HSTS and JSON logs (default: development)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Session signing secret, at least 32 characters (required)
/// - `JWT_EXPIRATION_HOURS`: Session lifetime (default: 24)
/// - `MAIL_API_URL` / `MAIL_API_KEY`: Mail API endpoint and key; mail is only
///   logged unless both are set
/// - `MAIL_FROM`: Sender address (default: `My Notebook <noreply@mynotebook.local>`)
/// - `PUBLIC_URL`: Externally visible base URL of this server, used in
///   verification links (default: `http://localhost:{API_PORT}`)
/// - `FRONTEND_URL`: Base URL of the web app (default: http://localhost:3000)
/// - `RESET_TOKEN_TTL_MINUTES`: Lifetime of password-reset links (default: 60)
///
/// # Example
///
/// ```no_run
/// use mynotebook_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub links: LinkConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS, JSON logs)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for session signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Session lifetime in hours
    pub expiration_hours: i64,
}

/// Mail transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_url: Option<String>,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub from: String,
}

/// Where emailed links point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Base URL of this API as seen by users
    pub public_url: String,

    /// Base URL of the web frontend
    pub frontend_url: String,

    /// Password-reset link lifetime in minutes
    pub reset_token_ttl_minutes: i64,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(&get, "API_PORT", 8080)?;

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let production = get("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expiration_hours: i64 = parse_or(&get, "JWT_EXPIRATION_HOURS", 24)?;
        if expiration_hours <= 0 {
            anyhow::bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let reset_token_ttl_minutes: i64 = parse_or(&get, "RESET_TOKEN_TTL_MINUTES", 60)?;
        if reset_token_ttl_minutes <= 0 {
            anyhow::bail!("RESET_TOKEN_TTL_MINUTES must be positive");
        }

        Ok(Self {
            api: ApiConfig {
                host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
            mail: MailConfig {
                api_url: get("MAIL_API_URL"),
                api_key: get("MAIL_API_KEY"),
                from: get("MAIL_FROM")
                    .unwrap_or_else(|| "My Notebook <noreply@mynotebook.local>".to_string()),
            },
            links: LinkConfig {
                public_url: trim_base(
                    get("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{}", port)),
                ),
                frontend_url: trim_base(
                    get("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
                ),
                reset_token_ttl_minutes,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert!(!config.api.production);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.expiration_hours, 24);
        assert!(config.mail.api_url.is_none());
        assert_eq!(config.links.public_url, "http://localhost:8080");
        assert_eq!(config.links.frontend_url, "http://localhost:3000");
        assert_eq!(config.links.reset_token_ttl_minutes, 60);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("CORS_ORIGINS", "https://notes.example.com, https://admin.example.com"),
            ("APP_ENV", "Production"),
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_HOURS", "2"),
            ("MAIL_API_URL", "https://api.resend.com/emails"),
            ("MAIL_API_KEY", "re_123"),
            ("FRONTEND_URL", "https://notes.example.com/"),
            ("RESET_TOKEN_TTL_MINUTES", "15"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.api.cors_origins.len(), 2);
        assert!(config.api.production);
        assert_eq!(config.jwt.expiration_hours, 2);
        assert_eq!(config.mail.api_key.as_deref(), Some("re_123"));
        assert_eq!(config.links.public_url, "http://localhost:9000");
        assert_eq!(config.links.frontend_url, "https://notes.example.com");
        assert_eq!(config.links.reset_token_ttl_minutes, 15);
    }

    #[test]
    fn test_missing_required() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", "short"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let base = [
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ];

        let mut vars = base.to_vec();
        vars.push(("API_PORT", "eighty"));
        assert!(load(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("RESET_TOKEN_TTL_MINUTES", "0"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("MAIL_API_KEY", "re_123"),
        ])
        .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
        assert!(!json.contains("re_123"));
    }
}
