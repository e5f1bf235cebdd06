use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    models::{Account, AccountId, AccountStatus, Profile, StoredToken, VerificationCommit},
    CredentialStore, StoreResult,
};
use crate::errors::StoreError;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    profiles: HashMap<AccountId, Profile>,
    verification_tokens: HashMap<String, StoredToken>,
    reset_tokens: HashMap<String, StoredToken>,
    sessions: HashMap<String, StoredToken>,
}

impl MemoryState {
    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|account| account.email == email)
    }
}

/// Process-local [`CredentialStore`] for development and tests.
///
/// Units of work run against a copy of the state that replaces the original only when the
/// whole unit succeeds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_next_commit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next unit of work fail after its writes were staged but before they commit.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub fn account(&self, account_id: &AccountId) -> Option<Account> {
        self.lock().accounts.get(account_id).cloned()
    }

    pub fn profile(&self, account_id: &AccountId) -> Option<Profile> {
        self.lock().profiles.get(account_id).cloned()
    }

    pub fn verification_tokens_for(&self, account_id: &AccountId) -> Vec<StoredToken> {
        Self::owned_by(&self.lock().verification_tokens, account_id)
    }

    pub fn reset_tokens_for(&self, account_id: &AccountId) -> Vec<StoredToken> {
        Self::owned_by(&self.lock().reset_tokens, account_id)
    }

    pub fn sessions_for(&self, account_id: &AccountId) -> Vec<StoredToken> {
        Self::owned_by(&self.lock().sessions, account_id)
    }

    /// Inserts an account directly, e.g. one that only signs in through an external provider.
    pub fn insert_account(&self, account: Account) {
        self.lock().accounts.insert(account.id.clone(), account);
    }

    fn owned_by(tokens: &HashMap<String, StoredToken>, account_id: &AccountId) -> Vec<StoredToken> {
        tokens
            .values()
            .filter(|token| &token.account_id == account_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unit_of_work<T>(
        &self,
        work: impl FnOnce(&mut MemoryState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut state = self.lock();
        let mut staged = state.clone();

        let output = work(&mut staged)?;

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable(String::from(
                "commit failed, unit of work rolled back",
            )));
        }

        *state = staged;
        Ok(output)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self.lock().account_by_email(email).cloned())
    }

    async fn find_account(&self, account_id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.lock().accounts.get(account_id).cloned())
    }

    async fn create_registration(
        &self,
        account: &Account,
        profile: &Profile,
        verification_token: &StoredToken,
    ) -> StoreResult<()> {
        self.unit_of_work(|state| {
            if state.account_by_email(&account.email).is_some() {
                return Err(StoreError::Conflict(format!(
                    "account with email {} already exists",
                    account.email
                )));
            }

            state.accounts.insert(account.id.clone(), account.clone());
            state.profiles.insert(account.id.clone(), profile.clone());
            state.verification_tokens.insert(
                verification_token.token_hash.clone(),
                verification_token.clone(),
            );

            Ok(())
        })
    }

    async fn update_password(
        &self,
        account_id: &AccountId,
        password_digest: &str,
    ) -> StoreResult<()> {
        self.unit_of_work(|state| {
            if let Some(account) = state.accounts.get_mut(account_id) {
                account.password_digest = Some(password_digest.to_owned());
            }

            Ok(())
        })
    }

    async fn find_verification_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        Ok(self.lock().verification_tokens.get(token_hash).cloned())
    }

    async fn delete_verification_token(&self, token_hash: &str) -> StoreResult<()> {
        self.unit_of_work(|state| {
            state.verification_tokens.remove(token_hash);
            Ok(())
        })
    }

    async fn replace_verification_tokens(&self, token: &StoredToken) -> StoreResult<()> {
        self.unit_of_work(|state| {
            state
                .verification_tokens
                .retain(|_, existing| existing.account_id != token.account_id);
            state
                .verification_tokens
                .insert(token.token_hash.clone(), token.clone());

            Ok(())
        })
    }

    async fn complete_verification(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        verified_at: DateTime<Utc>,
    ) -> StoreResult<VerificationCommit> {
        self.unit_of_work(|state| {
            if state.verification_tokens.remove(token_hash).is_none() {
                return Err(StoreError::TokenConsumed);
            }

            match state.accounts.get_mut(account_id) {
                Some(account) if account.email_verified_at.is_none() => {
                    account.email_verified_at = Some(verified_at);
                    account.status = AccountStatus::Verified;
                    Ok(VerificationCommit::Verified)
                }
                _ => Ok(VerificationCommit::AlreadyVerified),
            }
        })
    }

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        Ok(self.lock().reset_tokens.get(token_hash).cloned())
    }

    async fn delete_reset_token(&self, token_hash: &str) -> StoreResult<()> {
        self.unit_of_work(|state| {
            state.reset_tokens.remove(token_hash);
            Ok(())
        })
    }

    async fn replace_reset_tokens(&self, token: &StoredToken) -> StoreResult<()> {
        self.unit_of_work(|state| {
            state
                .reset_tokens
                .retain(|_, existing| existing.account_id != token.account_id);
            state
                .reset_tokens
                .insert(token.token_hash.clone(), token.clone());

            Ok(())
        })
    }

    async fn complete_password_reset(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        password_digest: &str,
    ) -> StoreResult<()> {
        self.unit_of_work(|state| {
            if state.reset_tokens.remove(token_hash).is_none() {
                return Err(StoreError::TokenConsumed);
            }

            if let Some(account) = state.accounts.get_mut(account_id) {
                account.password_digest = Some(password_digest.to_owned());
            }

            Ok(())
        })
    }

    async fn create_session(&self, session: &StoredToken) -> StoreResult<()> {
        self.unit_of_work(|state| {
            state
                .sessions
                .insert(session.token_hash.clone(), session.clone());
            Ok(())
        })
    }

    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        Ok(self.lock().sessions.get(token_hash).cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        self.unit_of_work(|state| {
            state.sessions.remove(token_hash);
            Ok(())
        })
    }
}
