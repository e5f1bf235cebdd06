use axum::{Extension, Json};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::{CredentialLifecycle, SignInRequest},
    messages::{Locale, Message},
    routes::Payload,
    services::database::Role,
    utils::cookies::session_cookie,
};

#[derive(Debug, Serialize)]
pub struct RouteOutput {
    success: String,
    email: String,
    role: Role,
    expires_at: DateTime<Utc>,
}

#[axum::debug_handler]
pub async fn signin(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    jar: CookieJar,
    Payload(payload): Payload<SignInRequest>,
) -> Result<(CookieJar, Json<RouteOutput>), ApiError<LifecycleError>> {
    let signed_in = lifecycle
        .sign_in(payload)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    let jar = jar.add(session_cookie(signed_in.token, signed_in.expires_at));

    Ok((
        jar,
        Json(RouteOutput {
            success: Message::SignedIn.text(locale),
            email: signed_in.account.email,
            role: signed_in.account.role,
            expires_at: signed_in.expires_at,
        }),
    ))
}
