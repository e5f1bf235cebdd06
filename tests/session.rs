mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::{Duration, Utc};
use common::{harness, register_request, RecordingNotifier, TestHarness};
use scholarship_auth::{
    config::AuthConfig,
    errors::LifecycleError,
    lifecycle::{ChangePasswordRequest, CredentialLifecycle, SignInRequest},
    services::database::{Account, AccountId, AccountStatus, MemoryStore, Role},
    utils::{
        clock::ManualClock,
        crypto::{Argon2Hasher, CredentialHasher},
    },
};

/// Counts password checks so tests can see how much hashing a request did.
struct CountingHasher {
    inner: Argon2Hasher,
    verifies: AtomicUsize,
}

impl CredentialHasher for CountingHasher {
    fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        self.inner.hash(password)
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, argon2::password_hash::Error> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(password, digest)
    }
}

fn credentials(email: &str, password: &str) -> SignInRequest {
    SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

async fn verified(h: &TestHarness, email: &str) -> Account {
    let account = h.lifecycle.register(register_request(email)).await.unwrap();
    let token = h.notifier.last_verification_token().unwrap();
    h.lifecycle.verify_email(&token).await.unwrap();
    account
}

#[tokio::test]
async fn unverified_account_cannot_sign_in() {
    let h = harness();
    h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();

    let result = h
        .lifecycle
        .sign_in(credentials("a@nu.ac.th", "scholar2025"))
        .await;

    assert!(matches!(result, Err(LifecycleError::EmailNotVerified)));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let h = harness();
    verified(&h, "a@nu.ac.th").await;

    let wrong = h.lifecycle.sign_in(credentials("a@nu.ac.th", "guess1234")).await;
    let unknown = h
        .lifecycle
        .sign_in(credentials("ghost@nu.ac.th", "scholar2025"))
        .await;

    assert!(matches!(wrong, Err(LifecycleError::InvalidCredentials)));
    assert!(matches!(unknown, Err(LifecycleError::InvalidCredentials)));
}

#[tokio::test]
async fn session_resolves_until_it_expires() {
    let h = harness();
    let account = verified(&h, "a@nu.ac.th").await;

    let signed_in = h
        .lifecycle
        .sign_in(credentials("A@nu.ac.th", "scholar2025"))
        .await
        .unwrap();

    let caller = h
        .lifecycle
        .resolve_caller(Some(&signed_in.token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(caller.account_id, account.id);
    assert_eq!(caller.role, Role::Student);

    h.clock.advance(Duration::days(30));

    assert!(h
        .lifecycle
        .resolve_caller(Some(&signed_in.token))
        .await
        .unwrap()
        .is_none());
    assert!(h.store.sessions_for(&account.id).is_empty());
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let h = harness();
    verified(&h, "a@nu.ac.th").await;

    let signed_in = h
        .lifecycle
        .sign_in(credentials("a@nu.ac.th", "scholar2025"))
        .await
        .unwrap();

    h.lifecycle.sign_out(&signed_in.token).await.unwrap();

    assert!(h
        .lifecycle
        .resolve_caller(Some(&signed_in.token))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn change_password_requires_a_caller() {
    let h = harness();

    let result = h
        .lifecycle
        .change_password(
            None,
            ChangePasswordRequest {
                current_password: String::from("scholar2025"),
                new_password: String::from("newpass2025"),
            },
        )
        .await;

    assert!(matches!(result, Err(LifecycleError::Unauthorized)));
}

#[tokio::test]
async fn change_password_checks_the_current_one() {
    let h = harness();
    let account = verified(&h, "a@nu.ac.th").await;

    let signed_in = h
        .lifecycle
        .sign_in(credentials("a@nu.ac.th", "scholar2025"))
        .await
        .unwrap();
    let caller = h
        .lifecycle
        .resolve_caller(Some(&signed_in.token))
        .await
        .unwrap();

    let wrong = h
        .lifecycle
        .change_password(
            caller.as_ref(),
            ChangePasswordRequest {
                current_password: String::from("guess1234"),
                new_password: String::from("newpass2025"),
            },
        )
        .await;
    assert!(matches!(wrong, Err(LifecycleError::InvalidCredentials)));

    h.lifecycle
        .change_password(
            caller.as_ref(),
            ChangePasswordRequest {
                current_password: String::from("scholar2025"),
                new_password: String::from("newpass2025"),
            },
        )
        .await
        .unwrap();

    let digest = h.store.account(&account.id).unwrap().password_digest.unwrap();
    assert!(h.hasher.verify("newpass2025", &digest).unwrap());
}

#[tokio::test]
async fn failed_sign_ins_all_pay_for_a_password_check() {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(CountingHasher {
        inner: Argon2Hasher::with_params(8, 1, 1).unwrap(),
        verifies: AtomicUsize::new(0),
    });
    let lifecycle = CredentialLifecycle::new(
        store.clone(),
        Arc::new(RecordingNotifier::default()),
        hasher.clone(),
        Arc::new(ManualClock::new(Utc::now())),
        AuthConfig::default(),
    );

    store.insert_account(Account {
        id: AccountId(String::from("oauth-only")),
        email: String::from("oauth@nu.ac.th"),
        password_digest: None,
        email_verified_at: Some(Utc::now()),
        role: Role::Student,
        status: AccountStatus::Verified,
        created_at: Utc::now(),
    });

    let unknown = lifecycle
        .sign_in(credentials("ghost@nu.ac.th", "scholar2025"))
        .await;
    assert!(matches!(unknown, Err(LifecycleError::InvalidCredentials)));
    assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1);

    let passwordless = lifecycle
        .sign_in(credentials("oauth@nu.ac.th", "scholar2025"))
        .await;
    assert!(matches!(passwordless, Err(LifecycleError::InvalidCredentials)));
    assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);
}
