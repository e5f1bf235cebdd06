use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use super::{Caller, CredentialLifecycle, EmailRequest};
use crate::{
    errors::{LifecycleError, LifecycleResult},
    logging::security_event,
    services::database::Account,
    utils::{crypto::hash_token, validation::validate_password_strength},
};

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Raw session token for the cookie. Only its digest is stored.
    pub token: String,
    pub account: Account,
    pub expires_at: DateTime<Utc>,
}

impl CredentialLifecycle {
    pub async fn sign_in(&self, request: SignInRequest) -> LifecycleResult<SignedIn> {
        let email = EmailRequest::new(&request.email);
        email.validate()?;

        let Some(account) = self.store.find_account_by_email(&email.email).await? else {
            self.verify_decoy(&request.password);
            security_event("sign_in_failed", Some(&email.email), "unknown email");
            return Err(LifecycleError::InvalidCredentials);
        };

        // Accounts created through an external provider have no password to check.
        let Some(digest) = account.password_digest.as_deref() else {
            self.verify_decoy(&request.password);
            security_event("sign_in_failed", Some(&email.email), "no password credential");
            return Err(LifecycleError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, digest)? {
            security_event("sign_in_failed", Some(&email.email), "wrong password");
            return Err(LifecycleError::InvalidCredentials);
        }

        if !account.is_verified() {
            return Err(LifecycleError::EmailNotVerified);
        }

        let (token, session) = self.issue_token(&account.id, self.config.session_ttl);
        self.store.create_session(&session).await?;

        tracing::info!(account_id = %account.id, "Signed in");

        Ok(SignedIn {
            token,
            expires_at: session.expires_at,
            account,
        })
    }

    /// Maps a session token to the caller it belongs to. Expired sessions are removed.
    pub async fn resolve_caller(&self, token: Option<&str>) -> LifecycleResult<Option<Caller>> {
        let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
            return Ok(None);
        };

        let token_hash = hash_token(token);

        let Some(session) = self.store.find_session(&token_hash).await? else {
            return Ok(None);
        };

        if session.is_expired(self.clock.now()) {
            self.store.delete_session(&token_hash).await?;
            return Ok(None);
        }

        let caller = self
            .store
            .find_account(&session.account_id)
            .await?
            .map(|account| Caller {
                account_id: account.id,
                email: account.email,
                role: account.role,
            });

        Ok(caller)
    }

    pub async fn sign_out(&self, token: &str) -> LifecycleResult<()> {
        self.store.delete_session(&hash_token(token.trim())).await?;

        Ok(())
    }

    pub async fn change_password(
        &self,
        caller: Option<&Caller>,
        request: ChangePasswordRequest,
    ) -> LifecycleResult<()> {
        let caller = caller.ok_or(LifecycleError::Unauthorized)?;

        request.validate()?;

        let account = self
            .store
            .find_account(&caller.account_id)
            .await?
            .ok_or(LifecycleError::Unauthorized)?;

        let Some(digest) = account.password_digest.as_deref() else {
            return Err(LifecycleError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.current_password, digest)? {
            security_event("password_change_failed", Some(&account.email), "wrong password");
            return Err(LifecycleError::InvalidCredentials);
        }

        let password_digest = self.hasher.hash(&request.new_password)?;
        self.store
            .update_password(&account.id, &password_digest)
            .await?;

        tracing::info!(account_id = %account.id, "Password changed");

        Ok(())
    }
}
