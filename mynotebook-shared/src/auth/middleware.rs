/// Session authentication from request headers
///
/// Protected routes accept the session token in either of two headers:
///
/// - `Authorization: Bearer <jwt>`
/// - `auth-token: <jwt>` (the header the notebook frontend sends)
///
/// The API's auth layer calls [`authenticate`] and inserts the resulting
/// [`AuthContext`] into the request extensions; handlers read it with
/// `Extension<AuthContext>`.
///
/// # Example
///
/// ```
/// use axum::http::{HeaderMap, HeaderValue};
/// use mynotebook_shared::auth::jwt::{create_token, Claims};
/// use mynotebook_shared::auth::middleware::authenticate;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id), "secret").unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert("auth-token", HeaderValue::from_str(&token).unwrap());
///
/// assert_eq!(authenticate(&headers, "secret").unwrap().user_id, user_id);
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Legacy header carrying the raw session token
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Authentication context added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for session authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Neither header present
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but not a Bearer token
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Pulls the raw session token out of the request headers
///
/// `Authorization` wins when both headers are present.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredentials)
}

/// Validates the session token carried by `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    Ok(AuthContext::from_jwt(claims.sub))
}
