use serde::Deserialize;
use validator::Validate;

use super::{CredentialLifecycle, EmailRequest};
use crate::{
    errors::{LifecycleError, LifecycleResult},
    logging::security_event,
    utils::{crypto::hash_token, validation::validate_password_strength},
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

impl CredentialLifecycle {
    /// Starts a password reset. The outcome is the same for unknown emails, accounts without
    /// a password and real accounts, so the endpoint cannot be used to discover members.
    pub async fn request_password_reset(&self, email: &str) -> LifecycleResult<()> {
        let request = EmailRequest::new(email);
        request.validate()?;

        self.enforce_rate_limit(
            "password_reset",
            &request.email,
            self.config.reset_rate_limit,
        )?;

        let account = match self.store.find_account_by_email(&request.email).await? {
            Some(account) if account.password_digest.is_some() => account,
            _ => {
                tracing::debug!("Password reset requested for an address without a password");
                return Ok(());
            }
        };

        let (token, reset_token) = self.issue_token(&account.id, self.config.reset_token_ttl);

        self.store.replace_reset_tokens(&reset_token).await?;

        tracing::info!(account_id = %account.id, "Password reset token issued");

        if let Err(e) = self
            .notifier
            .send_password_reset_email(&account.email, &token)
            .await
        {
            tracing::warn!(account_id = %account.id, error = %e, "Password reset email failed");
        }

        Ok(())
    }

    /// Read-only check used before showing the reset form.
    pub async fn validate_reset_token(&self, token: &str) -> LifecycleResult<bool> {
        let token_hash = hash_token(token.trim());

        let valid = match self.store.find_reset_token(&token_hash).await? {
            Some(record) => !record.is_expired(self.clock.now()),
            None => false,
        };

        Ok(valid)
    }

    /// Replaces the password and consumes the token in one unit of work.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> LifecycleResult<()> {
        request.validate()?;

        let token_hash = hash_token(request.token.trim());

        let Some(record) = self.store.find_reset_token(&token_hash).await? else {
            security_event("reset_token_invalid", None, "unknown reset token presented");
            return Err(LifecycleError::InvalidToken);
        };

        if record.is_expired(self.clock.now()) {
            self.store.delete_reset_token(&token_hash).await?;
            tracing::info!(account_id = %record.account_id, "Expired reset token removed");

            return Err(LifecycleError::ExpiredToken);
        }

        if self.store.find_account(&record.account_id).await?.is_none() {
            self.store.delete_reset_token(&token_hash).await?;

            return Err(LifecycleError::InvalidToken);
        }

        let password_digest = self.hasher.hash(&request.password)?;

        self.store
            .complete_password_reset(&record.account_id, &token_hash, &password_digest)
            .await?;

        tracing::info!(account_id = %record.account_id, "Password reset completed");

        Ok(())
    }
}
