use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};
use anyhow::Context;
use tracing::instrument;

use crate::{
    auth::{
        dto::{ActionResponse, LoginRequest, ResendVerifyRequest, SignUpRequest,
              VerifyEmailRequest},
        error::AuthError,
        services,
        session::{blank_session_cookie, extract_session_id, session_cookie},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/email-verify", post(email_verify))
        .route("/auth/email-verify/resend", post(resend_email_verify))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let creds = payload.validate()?;
    let session = services::sign_up(&state, creds).await?;

    let cookie =
        session_cookie(&state.config.session, &session.id).context("session cookie value")?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ActionResponse::redirect("/email-verify")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let creds = payload.validate()?;
    let session = services::login(&state, creds).await?;

    let cookie =
        session_cookie(&state.config.session, &session.id).context("session cookie value")?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ActionResponse::redirect("/")),
    ))
}

#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let session_id = extract_session_id(&headers, &state.config.session.cookie_name);
    services::logout(&state, session_id.as_deref()).await?;

    let cookie = blank_session_cookie(&state.config.session).context("blank cookie value")?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(ActionResponse::redirect("/")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn email_verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let claim = payload.validate()?;
    services::verify_email(&state, claim).await?;
    Ok(Json(ActionResponse::redirect("/")))
}

#[instrument(skip(state, payload))]
pub async fn resend_email_verify(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerifyRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = payload.validate()?;
    services::resend_verification(&state, &email).await?;
    Ok(Json(ActionResponse::success("Code email sent successfully")))
}
