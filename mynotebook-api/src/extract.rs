/// Request extractors
///
/// [`ValidatedJson`] deserializes a JSON body and runs its `validator` rules,
/// so handlers only ever see well-formed input. Every failure (missing
/// content type, bad JSON, missing or mistyped field, rule violation) is an
/// `ApiError` and renders as a 400 in the usual error envelope.
///
/// # Example
///
/// ```no_run
/// use mynotebook_api::extract::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct Signup {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn signup(ValidatedJson(req): ValidatedJson<Signup>) -> String {
///     req.email
/// }
/// ```

use crate::error::{ApiError, ValidationErrorDetail};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has passed validation
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;

        Ok(Self(value))
    }
}

/// Convert body extraction failures to API errors
///
/// A body that parses but doesn't fit the request type is reported like any
/// other validation failure, naming the field when serde does.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        tracing::debug!(error = %text, "Rejected request body");

        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: missing_field(&text).unwrap_or("body").to_string(),
                message: text,
            }]),
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Expected a JSON body (Content-Type: application/json)".to_string())
            }
            _ => ApiError::BadRequest("Request body is not valid JSON".to_string()),
        }
    }
}

// serde reports "missing field `name`"
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next().filter(|f| !f.is_empty())
}
