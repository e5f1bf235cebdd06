//! Account verification, password reset and session operations.
//!
//! Every operation returns a [`LifecycleResult`]; nothing here panics or leaks store
//! details to the caller. The HTTP layer turns the error side into a localized response.

pub mod password_reset;
pub mod registration;
pub mod session;

use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use validator::Validate;

pub use password_reset::ResetPasswordRequest;
pub use registration::{RegisterRequest, VerificationOutcome};
pub use session::{ChangePasswordRequest, SignInRequest, SignedIn};

use crate::{
    config::AuthConfig,
    errors::{LifecycleError, LifecycleResult},
    logging::security_event,
    services::{
        database::{AccountId, CredentialStore, Role, StoredToken},
        email::Notifier,
        rate_limiter::{RateLimitPolicy, RateLimiter},
    },
    utils::{
        clock::Clock,
        crypto::{generate_token, hash_token, CredentialHasher},
        validation::normalize_email,
    },
};

/// Identity of an authenticated caller, resolved once per request and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account_id: AccountId,
    pub email: String,
    pub role: Role,
}

/// Payload of the endpoints that only take an email address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

impl EmailRequest {
    pub fn new(email: &str) -> Self {
        Self {
            email: normalize_email(email),
        }
    }
}

#[derive(Clone)]
pub struct CredentialLifecycle {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
    limiter: Arc<RateLimiter>,
    config: AuthConfig,
    /// Digest checked when there is no real one, so unknown emails cost the same as known ones.
    decoy_digest: Option<Arc<str>>,
}

impl CredentialLifecycle {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(clock.clone()));

        let decoy_digest = match hasher.hash(&generate_token()) {
            Ok(digest) => Some(Arc::from(digest)),
            Err(e) => {
                tracing::warn!(error = %e, "Could not prepare decoy digest");
                None
            }
        };

        Self {
            store,
            notifier,
            hasher,
            clock,
            limiter,
            config,
            decoy_digest,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Spends the same hashing work as a real password check and discards the result.
    fn verify_decoy(&self, password: &str) {
        if let Some(digest) = &self.decoy_digest {
            let _ = self.hasher.verify(password, digest);
        }
    }

    /// Returns the raw token for the user and the record to persist.
    fn issue_token(&self, account_id: &AccountId, ttl: Duration) -> (String, StoredToken) {
        let token = generate_token();
        let created_at = self.clock.now();

        let record = StoredToken {
            token_hash: hash_token(&token),
            account_id: account_id.clone(),
            created_at,
            expires_at: created_at + ttl,
        };

        (token, record)
    }

    fn enforce_rate_limit(
        &self,
        action: &str,
        email: &str,
        policy: RateLimitPolicy,
    ) -> LifecycleResult<()> {
        let key = format!("{action}:{email}");
        let decision = self.limiter.check_policy(&key, policy);

        if !decision.allowed {
            security_event("rate_limited", Some(email), action);

            return Err(LifecycleError::RateLimited {
                retry_after_seconds: decision.retry_after_seconds,
            });
        }

        Ok(())
    }
}
