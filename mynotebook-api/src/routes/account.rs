/// Email verification and password reset
///
/// # Endpoints
///
/// - `GET /auth/user/verify-email?token=...` - Redeem a verification link
/// - `POST /auth/user/reset-password` - Mail a password-reset link
/// - `POST /auth/user/newpassword` - Set a new password with a reset token
///
/// Tokens are mailed in plaintext and only their SHA-256 hashes are stored.
/// Verification links point at this server and end on the frontend login
/// page; reset links point at the frontend (`/reset/{token}`), which posts
/// the token back to `newpassword`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::auth::{BAD_CREDENTIALS, VERIFY_FIRST},
};
use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use chrono::Utc;
use mynotebook_shared::{
    auth::{password, token},
    mail::templates,
    models::user::User,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const INVALID_TOKEN: &str = "Invalid token";
const EXPIRED_TOKEN: &str = "Your token is expired";

/// Verification link query
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// Password-reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
}

/// New password submission
#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 1, message = "Token can not be blank"))]
    pub token: String,

    #[validate(length(min = 5, message = "Password must contain at least 5 characters"))]
    pub password: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub successful: bool,
    pub msg: String,
}

/// Redeems a verification link
///
/// Always redirects (303) to `{FRONTEND_URL}/login`, even when the query
/// string doesn't parse. The outcome only shows up in the logs and in whether
/// the next login succeeds.
pub async fn verify_email(
    State(state): State<AppState>,
    query: Option<Query<VerifyEmailQuery>>,
) -> Redirect {
    let login_page = format!("{}/login", state.config.links.frontend_url);

    let raw = query.and_then(|Query(q)| q.token);
    let Some(raw) = raw.filter(|t| token::is_well_formed(t)) else {
        tracing::debug!("Verification link without a usable token");
        return Redirect::to(&login_page);
    };

    match User::verify_email(&state.db, &token::hash_token(&raw)).await {
        Ok(Some(user)) => tracing::info!(user_id = %user.id, "Email verified"),
        Ok(None) => tracing::debug!("Verification token unknown or already used"),
        Err(e) => tracing::error!(error = %e, "Email verification failed"),
    }

    Redirect::to(&login_page)
}

/// Mails a password-reset link
///
/// # Endpoint
///
/// ```text
/// POST /auth/user/reset-password
/// Content-Type: application/json
///
/// { "email": "ada@example.com" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email unknown
/// - `401 Unauthorized`: Email not verified yet (a new verification link is mailed)
/// - `503 Service Unavailable`: The reset mail could not be sent
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest(BAD_CREDENTIALS.to_string()))?;

    if !user.email_verified {
        issue_verification_email(&state, &user).await;
        return Err(ApiError::Unauthorized(VERIFY_FIRST.to_string()));
    }

    let issued = token::generate_token();
    let ttl = state.reset_token_ttl();
    User::set_reset_token(&state.db, user.id, &issued.hash, Utc::now() + ttl).await?;

    let link = format!("{}/reset/{}", state.config.links.frontend_url, issued.token);
    let message =
        templates::password_reset_email(&user.email, &user.name, &link, ttl.num_minutes());
    state.mailer.send(message).await?;

    tracing::info!(user_id = %user.id, "Password reset link sent");

    Ok(Json(MessageResponse {
        successful: true,
        msg: "Password reset link is sent to your mail".to_string(),
    }))
}

/// Sets a new password using a reset token
///
/// # Endpoint
///
/// ```text
/// POST /auth/user/newpassword
/// Content-Type: application/json
///
/// { "token": "<128 hex chars>", "password": "new secret" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, token unknown, used or expired
pub async fn apply_new_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !token::is_well_formed(&req.token) {
        return Err(ApiError::BadRequest(INVALID_TOKEN.to_string()));
    }
    let token_hash = token::hash_token(&req.token);

    let user = User::find_by_reset_token(&state.db, &token_hash)
        .await?
        .ok_or_else(|| ApiError::BadRequest(INVALID_TOKEN.to_string()))?;

    if !user.reset_token_is_live(Utc::now()) {
        return Err(ApiError::BadRequest(EXPIRED_TOKEN.to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    if !User::reset_password(&state.db, user.id, &token_hash, &password_hash).await? {
        // Consumed by a concurrent request after the lookup
        return Err(ApiError::BadRequest(INVALID_TOKEN.to_string()));
    }

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(Json(MessageResponse {
        successful: true,
        msg: "Your password has been changed".to_string(),
    }))
}

/// Rotates the user's verification token and mails the new link
///
/// Failures are logged only; the caller's response doesn't depend on them,
/// and the user gets another link on the next login. Already verified users
/// are skipped.
pub(crate) async fn issue_verification_email(state: &AppState, user: &User) {
    let issued = token::generate_token();

    match User::set_verification_token(&state.db, user.id, &issued.hash).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(user_id = %user.id, "No verification needed");
            return;
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Could not store verification token");
            return;
        }
    }

    let link = format!(
        "{}/auth/user/verify-email?token={}",
        state.config.links.public_url, issued.token
    );
    let message = templates::verification_email(&user.email, &user.name, &link);

    match state.mailer.send(message).await {
        Ok(()) => tracing::info!(user_id = %user.id, "Verification link sent"),
        Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Could not send verification mail"),
    }
}
