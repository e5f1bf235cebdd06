use derive_more::Display;
use hyper::StatusCode;

use super::{CommonError, ErrorResponse, StoreError};
use crate::{
    messages::{minutes_until, Locale, Message},
    utils::validation::first_message,
};

#[derive(Debug, Display)]
pub enum LifecycleError {
    #[display("{_0}")]
    Common(CommonError),
    #[display("email already registered")]
    DuplicateEmail,
    /// No matching token. Unknown and already consumed tokens are deliberately indistinguishable.
    #[display("token not found")]
    InvalidToken,
    #[display("token expired")]
    ExpiredToken,
    #[display("rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },
    #[display("caller is not authorized")]
    Unauthorized,
    #[display("invalid credentials")]
    InvalidCredentials,
    #[display("email not verified")]
    EmailNotVerified,
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl std::error::Error for LifecycleError {}

impl ErrorResponse for LifecycleError {
    fn error_name(&self) -> &str {
        match self {
            LifecycleError::Common(e) => e.error_name(),
            LifecycleError::DuplicateEmail => "duplicate_email",
            LifecycleError::InvalidToken => "invalid_token",
            LifecycleError::ExpiredToken => "expired_token",
            LifecycleError::RateLimited { .. } => "rate_limited",
            LifecycleError::Unauthorized => "unauthorized",
            LifecycleError::InvalidCredentials => "invalid_credentials",
            LifecycleError::EmailNotVerified => "email_not_verified",
        }
    }

    fn error_message(&self, locale: Locale) -> String {
        let message = match self {
            LifecycleError::Common(e) => return e.error_message(locale),
            LifecycleError::DuplicateEmail => Message::DuplicateEmail,
            LifecycleError::InvalidToken => Message::InvalidToken,
            LifecycleError::ExpiredToken => Message::ExpiredToken,
            LifecycleError::RateLimited {
                retry_after_seconds,
            } => Message::RateLimited {
                minutes: minutes_until(*retry_after_seconds),
            },
            LifecycleError::Unauthorized => Message::Unauthorized,
            LifecycleError::InvalidCredentials => Message::InvalidCredentials,
            LifecycleError::EmailNotVerified => Message::EmailNotVerified,
        };

        message.text(locale)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            LifecycleError::Common(e) => e.status_code(),
            LifecycleError::DuplicateEmail => StatusCode::CONFLICT,
            LifecycleError::InvalidToken => StatusCode::BAD_REQUEST,
            LifecycleError::ExpiredToken => StatusCode::BAD_REQUEST,
            LifecycleError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            LifecycleError::Unauthorized => StatusCode::UNAUTHORIZED,
            LifecycleError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LifecycleError::EmailNotVerified => StatusCode::FORBIDDEN,
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            LifecycleError::RateLimited {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

impl ErrorResponse for CommonError {
    fn error_name(&self) -> &str {
        match self {
            CommonError::Validation(_) | CommonError::MalformedBody(_) => "validation_error",
            CommonError::Store(_) => "internal_error",
            CommonError::Hashing(_) => "internal_error",
        }
    }

    fn error_message(&self, locale: Locale) -> String {
        match (self, locale) {
            // Field messages come from the validators and are written in English.
            (CommonError::Validation(errors), Locale::En) => first_message(errors)
                .unwrap_or_else(|| Message::InvalidInput.text(locale)),
            (CommonError::Validation(_), _) | (CommonError::MalformedBody(_), _) => {
                Message::InvalidInput.text(locale)
            }
            (CommonError::Store(_), _) | (CommonError::Hashing(_), _) => {
                Message::Internal.text(locale)
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CommonError::Validation(_) | CommonError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            CommonError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CommonError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CommonError> for LifecycleError {
    fn from(error: CommonError) -> Self {
        LifecycleError::Common(error)
    }
}

// Automatic Error Conversion

impl From<validator::ValidationErrors> for LifecycleError {
    fn from(error: validator::ValidationErrors) -> Self {
        LifecycleError::Common(CommonError::Validation(error))
    }
}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        match error {
            // Lost a race for the token; the caller sees it as already used.
            StoreError::TokenConsumed => LifecycleError::InvalidToken,
            error => LifecycleError::Common(CommonError::Store(error)),
        }
    }
}

impl From<argon2::password_hash::Error> for LifecycleError {
    fn from(error: argon2::password_hash::Error) -> Self {
        LifecycleError::Common(CommonError::Hashing(error))
    }
}
