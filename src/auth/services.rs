use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::dto::{LoginCredentials, SignUpCredentials, VerifyEmail};
use crate::auth::error::AuthError;
use crate::auth::generate::{entity_id, session_id, six_digit_code};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::{EmailToken, Session, User};
use crate::mailer::MailPurpose;
use crate::state::AppState;

/// Verification codes live for one hour from (re)issue.
pub const TOKEN_TTL: Duration = Duration::hours(1);
/// Minimum gap between two verification emails to the same user.
pub const RESEND_COOLDOWN: Duration = Duration::seconds(60);

/// Display name synthesized from the email local-part: split on
/// non-alphanumeric boundaries, capitalize each segment, join with spaces.
/// "Jane.Doe@mail.com" becomes "Jane Doe".
pub(crate) fn placeholder_name(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or(email);
    local_part
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole seconds to wait before the next resend, `None` once the
/// cooldown has elapsed. Remainders round up so 59.001s reads as 60.
pub(crate) fn seconds_until_resend(
    last_sent_at: OffsetDateTime,
    now: OffsetDateTime,
) -> Option<u64> {
    let elapsed = now - last_sent_at;
    if elapsed >= RESEND_COOLDOWN {
        return None;
    }
    let remaining_ms = (RESEND_COOLDOWN - elapsed).whole_milliseconds();
    Some((remaining_ms as u128).div_ceil(1000).max(1) as u64)
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => {
            db_err.code().is_some_and(|code| code.as_ref() == "23505")
        }
        _ => false,
    }
}

async fn create_session(state: &AppState, user_id: &str) -> Result<Session, AuthError> {
    let expires_at = OffsetDateTime::now_utc() + Duration::days(state.config.session.ttl_days);
    let session = Session::create(&state.db, &session_id(), user_id, expires_at).await?;
    Ok(session)
}

/// Create the user, its pending verification token, and a session, in
/// that order: the token insert needs the user row, and the session
/// comes last so a token failure never leaves a logged-in user with no
/// pending verification record.
pub async fn sign_up(state: &AppState, creds: SignUpCredentials) -> Result<Session, AuthError> {
    let hashed = hash_password(&creds.password)?;

    // Fast-path duplicate check; the unique constraint on email is the
    // authoritative one and catches the race between check and insert.
    if User::find_by_email(&state.db, &creds.email).await?.is_some() {
        warn!(email = %creds.email, "email already registered");
        return Err(AuthError::DuplicateEmail);
    }

    let name = placeholder_name(&creds.email);
    let user = match User::create(&state.db, &entity_id(), &creds.email, &hashed, &name).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %creds.email, "email already registered (lost insert race)");
            return Err(AuthError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    let now = OffsetDateTime::now_utc();
    let code = six_digit_code();
    EmailToken::create(&state.db, &entity_id(), &user.id, &code, now, now + TOKEN_TTL).await?;

    // Fire and forget: a failed send is logged, never surfaced.
    if let Err(e) = state
        .mailer
        .send_verification_code(&user.email, &code, MailPurpose::SignUp)
        .await
    {
        warn!(error = %e, user_id = %user.id, "verification email send failed");
    }

    // Session even before verification, for a smoother first visit.
    let session = create_session(state, &user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok(session)
}

/// Unknown email and wrong password collapse into one error so callers
/// cannot enumerate accounts.
pub async fn login(state: &AppState, creds: LoginCredentials) -> Result<Session, AuthError> {
    let user = match User::find_by_email(&state.db, &creds.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %creds.email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(&creds.password, &user.password)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let session = create_session(state, &user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok(session)
}

/// Invalidate the session named by the request's cookie, if it is
/// still active.
pub async fn logout(state: &AppState, session_id: Option<&str>) -> Result<(), AuthError> {
    let id = session_id.ok_or(AuthError::Unauthorized)?;
    let session = Session::find_active(&state.db, id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Session::delete(&state.db, &session.id).await?;
    info!(user_id = %session.user_id, "session invalidated");
    Ok(())
}

/// Consume the one-time code. Expired tokens are deleted even on the
/// failure path so a later resend reports the row as gone.
pub async fn verify_email(state: &AppState, claim: VerifyEmail) -> Result<(), AuthError> {
    let token = EmailToken::find_by_user_and_code(&state.db, &claim.user_id, &claim.code)
        .await?
        .ok_or(AuthError::InvalidCode)?;

    if OffsetDateTime::now_utc() > token.expires_at {
        EmailToken::delete_for_user(&state.db, &token.user_id).await?;
        warn!(user_id = %token.user_id, "verification token expired");
        return Err(AuthError::ExpiredToken);
    }

    User::mark_email_verified(&state.db, &claim.user_id).await?;
    EmailToken::delete_for_user(&state.db, &token.user_id).await?;
    info!(user_id = %claim.user_id, "email verified");
    Ok(())
}

/// Rotate the pending code and send it again, at most once per minute.
/// The cooldown compares persisted timestamps, so it holds across
/// multiple server processes.
pub async fn resend_verification(state: &AppState, email: &str) -> Result<(), AuthError> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if user.email_verified {
        return Err(AuthError::AlreadyVerified);
    }

    let token = EmailToken::find_by_user(&state.db, &user.id)
        .await?
        .ok_or(AuthError::NoPendingToken)?;

    let now = OffsetDateTime::now_utc();
    if let Some(seconds_left) = seconds_until_resend(token.last_sent_at, now) {
        return Err(AuthError::RateLimited { seconds_left });
    }

    let code = six_digit_code();
    EmailToken::refresh(&state.db, &user.id, &code, now).await?;

    if let Err(e) = state
        .mailer
        .send_verification_code(&user.email, &code, MailPurpose::Resend)
        .await
    {
        warn!(error = %e, user_id = %user.id, "verification email resend failed");
    }

    info!(user_id = %user.id, "verification code resent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn placeholder_name_capitalizes_dotted_local_part() {
        assert_eq!(placeholder_name("Jane.Doe@mail.com"), "Jane Doe");
    }

    #[test]
    fn placeholder_name_splits_on_any_non_alphanumeric() {
        assert_eq!(placeholder_name("a_b-c@mail.com"), "A B C");
    }

    #[test]
    fn placeholder_name_keeps_single_segment() {
        assert_eq!(placeholder_name("jane@mail.com"), "Jane");
        assert_eq!(placeholder_name("JANE@mail.com"), "JANE");
    }

    #[test]
    fn placeholder_name_skips_empty_segments() {
        assert_eq!(placeholder_name("a..b@mail.com"), "A B");
    }

    #[test]
    fn resend_allowed_after_cooldown() {
        let sent = datetime!(2025-01-01 12:00:00 UTC);
        assert_eq!(seconds_until_resend(sent, sent + Duration::seconds(60)), None);
        assert_eq!(seconds_until_resend(sent, sent + Duration::seconds(90)), None);
    }

    #[test]
    fn resend_remaining_seconds_round_up() {
        let sent = datetime!(2025-01-01 12:00:00 UTC);
        // 0.999s elapsed leaves 59.001s, which reads as 60 whole seconds.
        assert_eq!(
            seconds_until_resend(sent, sent + Duration::milliseconds(999)),
            Some(60)
        );
        assert_eq!(
            seconds_until_resend(sent, sent + Duration::seconds(30)),
            Some(30)
        );
        // Just shy of the mark still reports one second.
        assert_eq!(
            seconds_until_resend(sent, sent + Duration::milliseconds(59_500)),
            Some(1)
        );
    }

    #[test]
    fn resend_remaining_stays_within_display_bounds() {
        let sent = datetime!(2025-01-01 12:00:00 UTC);
        for ms in [1i64, 500, 1_000, 30_000, 59_000, 59_999] {
            let left = seconds_until_resend(sent, sent + Duration::milliseconds(ms))
                .expect("still inside cooldown");
            assert!((1..=60).contains(&left), "{ms}ms elapsed gave {left}s");
        }
    }

    #[test]
    fn resend_immediately_after_send_reports_full_minute() {
        let sent = datetime!(2025-01-01 12:00:00 UTC);
        assert_eq!(seconds_until_resend(sent, sent), Some(60));
    }
}
