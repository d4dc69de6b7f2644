use crate::auth::repo_types::{EmailToken, Session, User};
use sqlx::PgPool;
use time::OffsetDateTime;

const USER_COLUMNS: &str =
    "id, name, role, email, password, avatar, email_verified, image, created_at, updated_at";

impl User {
    /// Find a user by (trimmed) email. Case is preserved in storage.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user with hashed password and placeholder display name.
    /// The unique constraint on email is the authoritative duplicate check;
    /// callers map its violation to the duplicate-email error.
    pub async fn create(
        db: &PgPool,
        id: &str,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password, name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Flip the verified flag; the updated_at trigger refreshes the row.
    pub async fn mark_email_verified(db: &PgPool, id: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET email_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl Session {
    pub async fn create(
        db: &PgPool,
        id: &str,
        user_id: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    /// Look up a session that has not yet expired. Expired rows are
    /// simply not visible; nothing reaps them here.
    pub async fn find_active(db: &PgPool, id: &str) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE id = $1 AND expires_at > now()
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(session)
    }

    pub async fn delete(db: &PgPool, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl EmailToken {
    pub async fn create(
        db: &PgPool,
        id: &str,
        user_id: &str,
        code: &str,
        last_sent_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<EmailToken> {
        let token = sqlx::query_as::<_, EmailToken>(
            r#"
            INSERT INTO email_tokens (id, user_id, token, last_sent_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token, last_sent_at, expires_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(code)
        .bind(last_sent_at)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(token)
    }

    pub async fn find_by_user(db: &PgPool, user_id: &str) -> anyhow::Result<Option<EmailToken>> {
        let token = sqlx::query_as::<_, EmailToken>(
            r#"
            SELECT id, user_id, token, last_sent_at, expires_at
            FROM email_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(token)
    }

    pub async fn find_by_user_and_code(
        db: &PgPool,
        user_id: &str,
        code: &str,
    ) -> anyhow::Result<Option<EmailToken>> {
        let token = sqlx::query_as::<_, EmailToken>(
            r#"
            SELECT id, user_id, token, last_sent_at, expires_at
            FROM email_tokens
            WHERE user_id = $1 AND token = $2
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(token)
    }

    /// Overwrite the code and send timestamp in place; never creates a row.
    pub async fn refresh(
        db: &PgPool,
        user_id: &str,
        code: &str,
        last_sent_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE email_tokens SET token = $2, last_sent_at = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(code)
            .bind(last_sent_at)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete_for_user(db: &PgPool, user_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM email_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
