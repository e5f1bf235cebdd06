use axum::Extension;
use axum_extra::extract::{cookie::Cookie, CookieJar};
use hyper::StatusCode;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::CredentialLifecycle,
    messages::Locale,
    utils::cookies::SESSION_COOKIE,
};

#[axum::debug_handler]
pub async fn signout(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError<LifecycleError>> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        lifecycle
            .sign_out(cookie.value())
            .await
            .map_err(|e| ApiError::new(e, locale))?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    Ok((jar, StatusCode::NO_CONTENT))
}
