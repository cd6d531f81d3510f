/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     verification_token_hash VARCHAR(64),
///     reset_token_hash VARCHAR(64),
///     reset_token_expires_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Token lifecycle
///
/// - `verification_token_hash` is set at registration (and rotated on every
///   resend) and cleared by the one statement that flips `email_verified`.
/// - `reset_token_hash` / `reset_token_expires_at` are set together by a reset
///   request and cleared together when the new password is stored.
///
/// Token columns hold SHA-256 digests (see `auth::token`), never the values
/// that were mailed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

// `email` is CITEXT; cast so it decodes as a plain string
const USER_COLUMNS: &str = "id, name, email::TEXT AS email, password_hash, email_verified, \
     verification_token_hash, reset_token_hash, reset_token_expires_at, \
     created_at, updated_at, last_login_at";

/// A notebook account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique and case-insensitive (CITEXT)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the email verification link has been followed
    pub email_verified: bool,

    /// Hash of the outstanding verification token
    #[serde(skip_serializing)]
    pub verification_token_hash: Option<String>,

    /// Hash of the outstanding password-reset token
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,

    /// Instant after which the reset token is no longer accepted
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Public view of an account, as returned by `getuser`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

impl User {
    /// Whether the stored reset token may still be redeemed at `now`
    ///
    /// A token is live up to and including its expiry instant. Without an
    /// expiry there is no reset in progress.
    pub fn reset_token_is_live(&self, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(_), Some(expires_at)) => now <= expires_at,
            _ => false,
        }
    }

    /// Inserts a new, unverified user
    ///
    /// # Errors
    ///
    /// Fails with a database error on the `users_email_key` constraint if the
    /// email is already registered.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1::CITEXT",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds the user holding an outstanding reset token, expired or not
    pub async fn find_by_reset_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE reset_token_hash = $1",
            USER_COLUMNS
        ))
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Replaces the verification token of an unverified user
    ///
    /// Returns false if the user doesn't exist or is already verified.
    pub async fn set_verification_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verification_token_hash = $2, updated_at = NOW()
            WHERE id = $1 AND email_verified = FALSE
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Redeems a verification token
    ///
    /// Marks the matching account verified and clears the token in a single
    /// statement, so each token verifies at most once. Returns the verified
    /// user, or None if no unverified account holds this token.
    pub async fn verify_email(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email_verified = TRUE, verification_token_hash = NULL, updated_at = NOW()
            WHERE verification_token_hash = $1 AND email_verified = FALSE
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Stores a reset token and its expiry, replacing any previous one
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a new password hash and consumes the reset token
    ///
    /// Only applies while `token_hash` is still the user's reset token, so two
    /// requests racing on the same link cannot both succeed. Returns false if
    /// the token was already consumed or replaced.
    pub async fn reset_password(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $3,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND reset_token_hash = $2
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Permanently deletes a user
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
