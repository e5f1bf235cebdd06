use serde::Deserialize;
use validator::Validate;

use super::{CredentialLifecycle, EmailRequest};
use crate::{
    errors::{LifecycleError, LifecycleResult, StoreError},
    logging::security_event,
    services::database::{Account, AccountId, AccountStatus, Profile, Role, VerificationCommit},
    utils::{
        crypto::{generate_uuid, hash_token},
        validation::{
            domain_not_allowed, email_domain_allowed, normalize_email, validate_not_blank,
            validate_password_strength, validate_student_id,
        },
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(
        length(max = 100, message = "Names can be at most 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub first_name: String,
    #[validate(
        length(max = 100, message = "Names can be at most 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub last_name: String,
    #[validate(custom(function = "validate_student_id"))]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    /// The account was verified earlier, e.g. by a duplicate email or a double click.
    AlreadyVerified,
}

impl CredentialLifecycle {
    /// Creates a pending account and mails its first verification link.
    ///
    /// Delivery failures are logged and do not undo the registration; the user can ask for a
    /// new link through [`CredentialLifecycle::resend_verification`].
    pub async fn register(&self, request: RegisterRequest) -> LifecycleResult<Account> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            first_name: request.first_name.trim().to_owned(),
            last_name: request.last_name.trim().to_owned(),
            student_id: request
                .student_id
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty()),
            ..request
        };

        request.validate()?;

        if !email_domain_allowed(&request.email, &self.config.allowed_email_domains) {
            return Err(domain_not_allowed("email").into());
        }

        if self
            .store
            .find_account_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(LifecycleError::DuplicateEmail);
        }

        let password_digest = self.hasher.hash(&request.password)?;

        let account = Account {
            id: AccountId(generate_uuid()),
            email: request.email,
            password_digest: Some(password_digest),
            email_verified_at: None,
            role: Role::Student,
            status: AccountStatus::Pending,
            created_at: self.clock.now(),
        };

        let profile = Profile {
            account_id: account.id.clone(),
            first_name: request.first_name,
            last_name: request.last_name,
            student_id: request.student_id,
        };

        let (token, verification_token) =
            self.issue_token(&account.id, self.config.verification_token_ttl);

        match self
            .store
            .create_registration(&account, &profile, &verification_token)
            .await
        {
            Ok(()) => {}
            // Lost a race against another registration for the same address.
            Err(StoreError::Conflict(_)) => return Err(LifecycleError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(account_id = %account.id, "Account registered");

        if let Err(e) = self
            .notifier
            .send_verification_email(&account.email, &token)
            .await
        {
            tracing::warn!(
                account_id = %account.id,
                error = %e,
                "Verification email failed, account kept"
            );
        }

        Ok(account)
    }

    pub async fn verify_email(&self, token: &str) -> LifecycleResult<VerificationOutcome> {
        let token_hash = hash_token(token.trim());

        let Some(record) = self.store.find_verification_token(&token_hash).await? else {
            return Err(LifecycleError::InvalidToken);
        };

        if record.is_expired(self.clock.now()) {
            self.store.delete_verification_token(&token_hash).await?;
            tracing::info!(account_id = %record.account_id, "Expired verification token removed");

            return Err(LifecycleError::ExpiredToken);
        }

        let Some(account) = self.store.find_account(&record.account_id).await? else {
            self.store.delete_verification_token(&token_hash).await?;

            return Err(LifecycleError::InvalidToken);
        };

        if account.is_verified() {
            self.store.delete_verification_token(&token_hash).await?;

            return Ok(VerificationOutcome::AlreadyVerified);
        }

        // A concurrent request may have consumed the token since it was read; the store
        // rejects that case and never rewrites an existing verification timestamp.
        let commit = self
            .store
            .complete_verification(&account.id, &token_hash, self.clock.now())
            .await?;

        match commit {
            VerificationCommit::Verified => {
                tracing::info!(account_id = %account.id, "Email verified");
                Ok(VerificationOutcome::Verified)
            }
            VerificationCommit::AlreadyVerified => Ok(VerificationOutcome::AlreadyVerified),
        }
    }

    /// Issues a fresh verification link for an unverified account.
    ///
    /// Answers the same way whether or not such an account exists.
    pub async fn resend_verification(&self, email: &str) -> LifecycleResult<()> {
        let request = EmailRequest::new(email);
        request.validate()?;

        self.enforce_rate_limit(
            "verification",
            &request.email,
            self.config.verification_rate_limit,
        )?;

        let account = match self.store.find_account_by_email(&request.email).await? {
            Some(account) if !account.is_verified() => account,
            Some(_) => return Ok(()),
            None => {
                security_event("verification_unknown_email", Some(&request.email), "resend");
                return Ok(());
            }
        };

        let (token, verification_token) =
            self.issue_token(&account.id, self.config.verification_token_ttl);

        self.store
            .replace_verification_tokens(&verification_token)
            .await?;

        if let Err(e) = self
            .notifier
            .send_verification_email(&account.email, &token)
            .await
        {
            tracing::warn!(account_id = %account.id, error = %e, "Verification email failed");
        }

        Ok(())
    }
}
