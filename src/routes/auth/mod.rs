pub mod email_verification;
pub mod password_change;
pub mod password_reset;
pub mod password_reset_request;
pub mod resend_verification;
pub mod signin;
pub mod signout;
pub mod signup;

use axum::{
    routing::{get, post},
    Router,
};
pub use email_verification::email_verification;
pub use password_change::password_change;
pub use password_reset::{password_reset, password_reset_validation};
pub use password_reset_request::password_reset_request;
pub use resend_verification::resend_verification;
pub use signin::signin;
pub use signout::signout;
pub use signup::signup;

pub fn auth_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/email-verification", post(email_verification))
        .route("/email-verification/resend", post(resend_verification))
        .route("/password-reset-request", post(password_reset_request))
        .route("/password-reset", post(password_reset))
        .route("/password-reset/:token", get(password_reset_validation))
        .route("/password-change", post(password_change))
}
