use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // Argon2 digest, never exposed in JSON
    pub avatar: Option<String>,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Server-side session row; the id doubles as the cookie value.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: OffsetDateTime,
}

/// Pending email-verification code. At most one row per user
/// (unique constraint on user_id); resends overwrite in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailToken {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub last_sent_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}
