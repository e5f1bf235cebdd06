use std::fmt::Display;

use axum::{
    http::{header::RETRY_AFTER, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use serde_json::json;

use crate::messages::Locale;

pub trait ErrorResponse {
    fn error_name(&self) -> &str;
    fn error_message(&self, locale: Locale) -> String;
    fn status_code(&self) -> StatusCode;

    fn retry_after(&self) -> Option<u64> {
        None
    }
}

pub struct ApiError<T> {
    pub error: T,
    pub locale: Locale,
}

impl<T> ApiError<T> {
    pub fn new(error: T, locale: Locale) -> Self {
        Self { error, locale }
    }
}

impl<T: ErrorResponse + Display> IntoResponse for ApiError<T> {
    fn into_response(self) -> Response {
        let status_code = self.error.status_code();

        // The cause stays in the logs, the client only sees the generic message.
        if status_code.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        } else {
            tracing::debug!(error = %self.error, status = %status_code, "request rejected");
        }

        let mut body = json!({
            "error": self.error.error_message(self.locale),
            "code": self.error.error_name(),
        });

        let retry_after = self.error.retry_after();
        if let Some(seconds) = retry_after {
            body["retry_after_seconds"] = json!(seconds);
        }

        let mut response = (status_code, Json(body)).into_response();

        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}
