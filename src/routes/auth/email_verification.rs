use axum::{Extension, Json};
use serde::Deserialize;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::{CredentialLifecycle, VerificationOutcome},
    messages::{Locale, Message},
    routes::{success, Payload, SuccessOutput},
};

#[derive(Debug, Deserialize)]
pub struct RoutePayload {
    token: String,
}

#[axum::debug_handler]
pub async fn email_verification(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    Payload(payload): Payload<RoutePayload>,
) -> Result<Json<SuccessOutput>, ApiError<LifecycleError>> {
    let outcome = lifecycle
        .verify_email(&payload.token)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    let message = match outcome {
        VerificationOutcome::Verified => Message::EmailVerified,
        VerificationOutcome::AlreadyVerified => Message::EmailAlreadyVerified,
    };

    Ok(success(message, locale))
}
