#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use scholarship_auth::{
    config::AuthConfig,
    lifecycle::{CredentialLifecycle, RegisterRequest},
    services::{
        database::{
            Account, AccountId, CredentialStore, MemoryStore, Profile, StoreResult, StoredToken,
            VerificationCommit,
        },
        email::{NotifyError, Notifier},
    },
    utils::{clock::ManualClock, crypto::Argon2Hasher},
};
use tokio::sync::Barrier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Verification { to: String, token: String },
    PasswordReset { to: String, token: String },
}

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_verification_token(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|sent| match sent {
            Sent::Verification { token, .. } => Some(token),
            _ => None,
        })
    }

    pub fn last_reset_token(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|sent| match sent {
            Sent::PasswordReset { token, .. } => Some(token),
            _ => None,
        })
    }

    fn record(&self, sent: Sent) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Rejected(String::from("mailbox unavailable")));
        }

        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), NotifyError> {
        self.record(Sent::Verification {
            to: to.to_string(),
            token: token.to_string(),
        })
    }

    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), NotifyError> {
        self.record(Sent::PasswordReset {
            to: to.to_string(),
            token: token.to_string(),
        })
    }
}

pub struct TestHarness {
    pub lifecycle: CredentialLifecycle,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub hasher: Arc<Argon2Hasher>,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> TestHarness {
    harness_with(AuthConfig::default(), RecordingNotifier::default())
}

pub fn harness_with(config: AuthConfig, notifier: RecordingNotifier) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(notifier);
    // Cheap parameters keep the suite fast.
    let hasher = Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(),
    ));

    let lifecycle = CredentialLifecycle::new(
        store.clone(),
        notifier.clone(),
        hasher.clone(),
        clock.clone(),
        config,
    );

    TestHarness {
        lifecycle,
        store,
        notifier,
        hasher,
        clock,
    }
}

pub fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: String::from("scholar2025"),
        first_name: String::from("Somchai"),
        last_name: String::from("Jaidee"),
        student_id: Some(String::from("64012345")),
    }
}

impl TestHarness {
    /// A second lifecycle over `store`, sharing this harness's notifier, hasher and clock.
    pub fn lifecycle_over(&self, store: Arc<dyn CredentialStore>) -> CredentialLifecycle {
        CredentialLifecycle::new(
            store,
            self.notifier.clone(),
            self.hasher.clone(),
            self.clock.clone(),
            AuthConfig::default(),
        )
    }
}

/// Holds every token lookup at a barrier so concurrent callers all read before any writes.
pub struct GatedStore {
    inner: Arc<MemoryStore>,
    gate: Barrier,
}

impl GatedStore {
    pub fn new(inner: Arc<MemoryStore>, callers: usize) -> Self {
        Self {
            inner,
            gate: Barrier::new(callers),
        }
    }
}

#[async_trait]
impl CredentialStore for GatedStore {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.inner.find_account_by_email(email).await
    }

    async fn find_account(&self, account_id: &AccountId) -> StoreResult<Option<Account>> {
        self.inner.find_account(account_id).await
    }

    async fn create_registration(
        &self,
        account: &Account,
        profile: &Profile,
        verification_token: &StoredToken,
    ) -> StoreResult<()> {
        self.inner
            .create_registration(account, profile, verification_token)
            .await
    }

    async fn update_password(
        &self,
        account_id: &AccountId,
        password_digest: &str,
    ) -> StoreResult<()> {
        self.inner.update_password(account_id, password_digest).await
    }

    async fn find_verification_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        let found = self.inner.find_verification_token(token_hash).await;
        self.gate.wait().await;
        found
    }

    async fn delete_verification_token(&self, token_hash: &str) -> StoreResult<()> {
        self.inner.delete_verification_token(token_hash).await
    }

    async fn replace_verification_tokens(&self, token: &StoredToken) -> StoreResult<()> {
        self.inner.replace_verification_tokens(token).await
    }

    async fn complete_verification(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        verified_at: DateTime<Utc>,
    ) -> StoreResult<VerificationCommit> {
        self.inner
            .complete_verification(account_id, token_hash, verified_at)
            .await
    }

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        let found = self.inner.find_reset_token(token_hash).await;
        self.gate.wait().await;
        found
    }

    async fn delete_reset_token(&self, token_hash: &str) -> StoreResult<()> {
        self.inner.delete_reset_token(token_hash).await
    }

    async fn replace_reset_tokens(&self, token: &StoredToken) -> StoreResult<()> {
        self.inner.replace_reset_tokens(token).await
    }

    async fn complete_password_reset(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        password_digest: &str,
    ) -> StoreResult<()> {
        self.inner
            .complete_password_reset(account_id, token_hash, password_digest)
            .await
    }

    async fn create_session(&self, session: &StoredToken) -> StoreResult<()> {
        self.inner.create_session(session).await
    }

    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        self.inner.find_session(token_hash).await
    }

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        self.inner.delete_session(token_hash).await
    }
}
