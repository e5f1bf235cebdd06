use axum::{Extension, Json};
use serde::Deserialize;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::CredentialLifecycle,
    messages::{Locale, Message},
    routes::{success, Payload, SuccessOutput},
};

#[derive(Debug, Deserialize)]
pub struct RoutePayload {
    email: String,
}

#[axum::debug_handler]
pub async fn resend_verification(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    Payload(payload): Payload<RoutePayload>,
) -> Result<Json<SuccessOutput>, ApiError<LifecycleError>> {
    lifecycle
        .resend_verification(&payload.email)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    Ok(success(Message::VerificationSent, locale))
}
