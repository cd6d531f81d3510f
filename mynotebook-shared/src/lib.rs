//! # mynotebook Shared Library
//!
//! This crate contains the account primitives used by the mynotebook API
//! server: credential hashing, session tokens, persistence and mail delivery.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT sessions, one-time tokens, header authentication
//! - `db`: Connection pool and migrations
//! - `models`: Database models
//! - `mail`: Mailer trait, HTTP and logging transports, message templates

pub mod auth;
pub mod db;
pub mod mail;
pub mod models;

/// Current version of the mynotebook shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
