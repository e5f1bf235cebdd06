pub mod auth;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json, Router,
};
use serde::Serialize;

use crate::{
    errors::{ApiError, CommonError, LifecycleError},
    messages::{Locale, Message},
};

#[async_trait]
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

/// JSON body whose rejections use the same error shape as every other failure.
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError<LifecycleError>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(req.headers());

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(ApiError::new(
                CommonError::MalformedBody(rejection.body_text()).into(),
                locale,
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessOutput {
    success: String,
}

pub fn success(message: Message, locale: Locale) -> Json<SuccessOutput> {
    Json(SuccessOutput {
        success: message.text(locale),
    })
}

fn api_v1_router() -> Router {
    Router::new().nest("/auth", auth::auth_router())
}

// Main router that serves as the entry point for all routes
pub fn main_router() -> Router {
    Router::new().nest("/api/v1", api_v1_router())
}
