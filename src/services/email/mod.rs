use async_trait::async_trait;
use derive_more::Display;
use resend_rs::{types::CreateEmailBaseOptions, Resend};

use crate::config::EmailConfig;

#[derive(Debug, Display)]
pub enum NotifyError {
    #[display("resend error: {_0}")]
    Resend(resend_rs::Error),
    #[display("delivery rejected: {_0}")]
    Rejected(String),
}

impl std::error::Error for NotifyError {}

impl From<resend_rs::Error> for NotifyError {
    fn from(error: resend_rs::Error) -> Self {
        NotifyError::Resend(error)
    }
}

/// Delivers token-bearing links. Callers treat delivery as fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), NotifyError>;

    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), NotifyError>;
}

pub fn verification_url(app_url: &str, token: &str) -> String {
    format!(
        "{}/auth/verify-email?token={}",
        app_url.trim_end_matches('/'),
        token
    )
}

pub fn password_reset_url(app_url: &str, token: &str) -> String {
    format!(
        "{}/auth/reset-password?token={}",
        app_url.trim_end_matches('/'),
        token
    )
}

/// Sends mail through the Resend API.
#[derive(Clone)]
pub struct EmailLayer {
    api_key: String,
    pub domain: String,
    pub sender_name: String,
    pub app_url: String,
}

impl EmailLayer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            domain: config.domain.clone(),
            sender_name: config.sender_name.clone(),
            app_url: config.app_url.clone(),
        }
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), NotifyError> {
        let resend = Resend::new(&self.api_key);

        let from = format!("{} <noreply@{}>", &self.sender_name, &self.domain);
        let to = [to.to_owned()];

        let email = CreateEmailBaseOptions::new(from, to, subject).with_html(html.as_str());

        let _email = resend.emails.send(email).await?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailLayer {
    async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), NotifyError> {
        let url = verification_url(&self.app_url, token);

        let html = format!(
            "
            <p>Welcome to the {name} scholarship portal.</p>
            <p>Please confirm your email address within 24 hours:</p>
            <a href=\"{url}\">Verify email</a>
            ",
            name = &self.sender_name,
        );

        self.send(to, "Verify your email address", html).await?;

        tracing::info!(to, "Verification email sent");
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), NotifyError> {
        let url = password_reset_url(&self.app_url, token);

        let html = format!(
            "
            <p>A password reset was requested for your account.</p>
            <p>The link below is valid for one hour:</p>
            <a href=\"{url}\">Reset password</a>
            <p>If you did not request this, you can ignore this email.</p>
            "
        );

        self.send(to, "Reset your password", html).await?;

        tracing::info!(to, "Password reset email sent");
        Ok(())
    }
}

/// Writes links to the log instead of sending them. Used with the in-memory store.
#[derive(Clone)]
pub struct LogNotifier {
    pub app_url: String,
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), NotifyError> {
        tracing::info!(to, url = %verification_url(&self.app_url, token), "Verification email (not sent)");
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), NotifyError> {
        tracing::info!(to, url = %password_reset_url(&self.app_url, token), "Password reset email (not sent)");
        Ok(())
    }
}
