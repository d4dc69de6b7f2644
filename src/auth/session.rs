use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// HttpOnly cookie carrying the session id.
pub fn session_cookie(
    config: &SessionConfig,
    session_id: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.ttl_days * 24 * 60 * 60;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name, session_id, max_age
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Blank cookie that overwrites the client's copy on logout.
pub fn blank_session_cookie(config: &SessionConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session id out of the request's Cookie header, if present.
pub fn extract_session_id(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?;
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(cookie_name)?.strip_prefix('='))
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}
