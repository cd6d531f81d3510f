/// Database models
///
/// - `user`: Notebook accounts, including email verification and password
///   reset state
///
/// # Example
///
/// ```no_run
/// use mynotebook_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
/// assert!(!user.email_verified);
/// # Ok(())
/// # }
/// ```

pub mod user;
