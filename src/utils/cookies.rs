use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use cookie::time::OffsetDateTime;

pub const SESSION_COOKIE: &str = "session_id";

pub fn session_cookie(session_token: String, expires_at: DateTime<Utc>) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(true)
        .http_only(true)
        .build();

    // Out-of-range timestamps fall back to a browser-session cookie.
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie.set_expires(expires);
    }

    cookie
}
