use axum::{Extension, Json};
use axum_extra::extract::CookieJar;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::{ChangePasswordRequest, CredentialLifecycle},
    messages::{Locale, Message},
    routes::{success, Payload, SuccessOutput},
    utils::cookies::SESSION_COOKIE,
};

#[axum::debug_handler]
pub async fn password_change(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    jar: CookieJar,
    Payload(payload): Payload<ChangePasswordRequest>,
) -> Result<Json<SuccessOutput>, ApiError<LifecycleError>> {
    let session_token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());

    let caller = lifecycle
        .resolve_caller(session_token)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    lifecycle
        .change_password(caller.as_ref(), payload)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    Ok(success(Message::PasswordChanged, locale))
}
