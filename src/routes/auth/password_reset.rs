use axum::{extract::Path, Extension, Json};
use serde::Serialize;

use crate::{
    errors::{ApiError, LifecycleError},
    lifecycle::{CredentialLifecycle, ResetPasswordRequest},
    messages::{Locale, Message},
    routes::{success, Payload, SuccessOutput},
};

#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    valid: bool,
    message: String,
}

#[axum::debug_handler]
pub async fn password_reset_validation(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    Path(token): Path<String>,
) -> Result<Json<ValidationOutput>, ApiError<LifecycleError>> {
    let valid = lifecycle
        .validate_reset_token(&token)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    let message = if valid {
        Message::ResetLinkValid
    } else {
        Message::ResetLinkInvalid
    };

    Ok(Json(ValidationOutput {
        valid,
        message: message.text(locale),
    }))
}

#[axum::debug_handler]
pub async fn password_reset(
    Extension(lifecycle): Extension<CredentialLifecycle>,
    locale: Locale,
    Payload(payload): Payload<ResetPasswordRequest>,
) -> Result<Json<SuccessOutput>, ApiError<LifecycleError>> {
    lifecycle
        .reset_password(payload)
        .await
        .map_err(|e| ApiError::new(e, locale))?;

    Ok(success(Message::PasswordResetComplete, locale))
}
