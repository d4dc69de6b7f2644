use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::error::{FieldError, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const CODE_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for sign-up.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up input that passed boundary validation. Email is trimmed,
/// case preserved.
#[derive(Debug, Clone)]
pub struct SignUpCredentials {
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(self) -> Result<SignUpCredentials, ValidationErrors> {
        let email = self.email.trim().to_string();
        let mut errors = Vec::new();
        if !is_valid_email(&email) {
            errors.push(FieldError {
                field: "email",
                message: "Invalid email address".into(),
            });
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            errors.push(FieldError {
                field: "password",
                message: "Must be at least 8 characters".into(),
            });
        }
        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }
        Ok(SignUpCredentials {
            email,
            password: self.password,
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<LoginCredentials, ValidationErrors> {
        let email = self.email.trim().to_string();
        let mut errors = Vec::new();
        if !is_valid_email(&email) {
            errors.push(FieldError {
                field: "email",
                message: "Invalid email address".into(),
            });
        }
        if self.password.is_empty() {
            errors.push(FieldError {
                field: "password",
                message: "Required".into(),
            });
        }
        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }
        Ok(LoginCredentials {
            email,
            password: self.password,
        })
    }
}

/// Request body for the one-time-code verification step.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct VerifyEmail {
    pub user_id: String,
    pub code: String,
}

impl VerifyEmailRequest {
    pub fn validate(self) -> Result<VerifyEmail, ValidationErrors> {
        let user_id = self.user_id.trim().to_string();
        let code = self.token.trim().to_string();
        let mut errors = Vec::new();
        if user_id.is_empty() {
            errors.push(FieldError {
                field: "user_id",
                message: "Required".into(),
            });
        }
        if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            errors.push(FieldError {
                field: "token",
                message: "Your one-time password must be 6 characters.".into(),
            });
        }
        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }
        Ok(VerifyEmail { user_id, code })
    }
}

/// Request body for resending the verification code.
#[derive(Debug, Deserialize)]
pub struct ResendVerifyRequest {
    pub email: String,
}

impl ResendVerifyRequest {
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(ValidationErrors(vec![FieldError {
                field: "email",
                message: "Invalid email address".into(),
            }]));
        }
        Ok(email)
    }
}

/// Uniform response body for every flow operation. An empty `error`
/// string is the success sentinel; `redirect_to` is a navigation hint
/// the boundary attaches on success, never an error.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub error: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub success: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl ActionResponse {
    pub fn redirect(to: &str) -> Self {
        Self {
            error: String::new(),
            success: String::new(),
            redirect_to: Some(to.to_string()),
        }
    }

    pub fn success(message: &str) -> Self {
        Self {
            error: String::new(),
            success: message.to_string(),
            redirect_to: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            error,
            success: String::new(),
            redirect_to: None,
        }
    }
}
