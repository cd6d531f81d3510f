/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/createuser` - Register a new user and get a session token
/// - `POST /auth/login` - Exchange email and password for a session token
/// - `POST /auth/getuser` - Current user profile (session required)
///
/// Accounts start unverified. Registration mails a verification link, and
/// logging in to an unverified account mails a fresh one instead of
/// issuing a session.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::account::issue_verification_email,
};
use axum::{extract::State, Extension, Json};
use mynotebook_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User, UserProfile},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) const BAD_CREDENTIALS: &str = "Incorrect password or email";
pub(crate) const VERIFY_FIRST: &str =
    "Please verify your email. Verification link is sent to your mail";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, message = "The name must contain at least 3 characters"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(length(min = 5, message = "Password must contain at least 5 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password can not be blank"))]
    pub password: String,
}

/// Response carrying a freshly issued session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub successful: bool,

    #[serde(rename = "jwttoken")]
    pub token: String,
}

/// Current user response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub successful: bool,
    pub user: UserProfile,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/createuser
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "successful": true, "jwttoken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Server error
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Json<SessionResponse>> {
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict(
            "This email is already registered. Please use another email or login".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent signup for the same email still hits the unique
    // constraint, which converts to the same 409.
    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    issue_verification_email(&state, &user).await;

    let token = jwt::issue_session(user.id, state.jwt_secret(), state.session_ttl())?;

    Ok(Json(SessionResponse {
        successful: true,
        token,
    }))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "secret" }
/// ```
///
/// # Response
///
/// ```json
/// { "successful": true, "jwttoken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or unknown email / wrong password
/// - `401 Unauthorized`: Email not verified yet (a new link is mailed)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest(BAD_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::BadRequest(BAD_CREDENTIALS.to_string()));
    }

    if !user.email_verified {
        issue_verification_email(&state, &user).await;
        return Err(ApiError::Unauthorized(VERIFY_FIRST.to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let token = jwt::issue_session(user.id, state.jwt_secret(), state.session_ttl())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(SessionResponse {
        successful: true,
        token,
    }))
}

/// Current user profile
///
/// Served behind the session layer, which puts `AuthContext` into the
/// request extensions.
///
/// # Response
///
/// ```json
/// {
///   "successful": true,
///   "user": {
///     "id": "uuid",
///     "name": "Ada Lovelace",
///     "email": "ada@example.com",
///     "email_verified": true,
///     "created_at": "2025-01-01T00:00:00Z"
///   }
/// }
/// ```
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        successful: true,
        user: UserProfile::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let req = CreateUserRequest {
            name: "Al".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let req = CreateUserRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "1234".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let req = CreateUserRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_validation() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_session_response_field_name() {
        let json = serde_json::to_value(SessionResponse {
            successful: true,
            token: "eyJ".to_string(),
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "successful": true, "jwttoken": "eyJ" }));
    }
}
