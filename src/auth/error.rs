use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;
use tracing::error;

use crate::auth::dto::ActionResponse;

/// One failed field check from boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Everything wrong with one request payload, gathered in a single pass.
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("email already taken")]
    DuplicateEmail,
    #[error("wrong email or password")]
    InvalidCredentials,
    #[error("no active session")]
    Unauthorized,
    #[error("no token matches that user and code")]
    InvalidCode,
    #[error("token has expired")]
    ExpiredToken,
    #[error("no user with that email")]
    UserNotFound,
    #[error("email already verified")]
    AlreadyVerified,
    #[error("no pending verification token")]
    NoPendingToken,
    #[error("resend rate limited, {seconds_left}s left")]
    RateLimited { seconds_left: u64 },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCode => StatusCode::BAD_REQUEST,
            AuthError::ExpiredToken => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::AlreadyVerified => StatusCode::CONFLICT,
            AuthError::NoPendingToken => StatusCode::NOT_FOUND,
            AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short human-readable string for the client. Infrastructure detail
    /// never leaves the server; invalid credentials stay deliberately vague
    /// so callers cannot tell a bad password from an unknown email.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(errors) => errors.summary(),
            AuthError::DuplicateEmail => "Email already taken".into(),
            AuthError::InvalidCredentials => "Wrong email or password".into(),
            AuthError::Unauthorized => "Unauthorized".into(),
            AuthError::InvalidCode => "Invalid code".into(),
            AuthError::ExpiredToken => "Token has expired".into(),
            AuthError::UserNotFound => "User not found".into(),
            AuthError::AlreadyVerified => "Email already verified".into(),
            AuthError::NoPendingToken => "No token found".into(),
            AuthError::RateLimited { seconds_left } => {
                format!("Please wait {seconds_left} more seconds before resending the code.")
            }
            AuthError::Unexpected(_) => "Something went wrong. Please try again.".into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Unexpected(ref e) = self {
            error!(error = %e, "unexpected auth failure");
        }
        let body = ActionResponse::failure(self.user_message());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_email_and_bad_password_share_one_message() {
        // Both cases collapse into the same variant by construction; the
        // message must not hint at which check failed.
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Wrong email or password"
        );
    }

    #[test]
    fn rate_limited_reports_seconds_left() {
        let err = AuthError::RateLimited { seconds_left: 42 };
        assert_eq!(
            err.user_message(),
            "Please wait 42 more seconds before resending the code."
        );
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unexpected_never_leaks_detail() {
        let err = AuthError::Unexpected(anyhow::anyhow!("pool timed out talking to pg"));
        let msg = err.user_message();
        assert!(!msg.contains("pg"));
        assert_eq!(msg, "Something went wrong. Please try again.");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_joins_field_messages() {
        let errors = ValidationErrors(vec![
            FieldError {
                field: "email",
                message: "Invalid email address".into(),
            },
            FieldError {
                field: "password",
                message: "Must be at least 8 characters".into(),
            },
        ]);
        let err = AuthError::from(errors);
        assert_eq!(
            err.user_message(),
            "Invalid email address, Must be at least 8 characters"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
