/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and the current-user lookup
/// - `account`: Email verification and password reset

pub mod account;
pub mod auth;
pub mod health;
