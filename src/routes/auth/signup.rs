use axum::{Extension, Json};
use hyper::StatusCode;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::{CredentialLifecycle, RegisterRequest},
    messages::{Locale, Message},
    routes::{success, Payload, SuccessOutput},
};

#[axum::debug_handler]
pub async fn signup(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    Payload(payload): Payload<RegisterRequest>,
) -> Result<(StatusCode, Json<SuccessOutput>), ApiError<LifecycleError>> {
    lifecycle
        .register(payload)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    Ok((
        StatusCode::CREATED,
        success(Message::RegistrationComplete, locale),
    ))
}
