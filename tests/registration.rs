mod common;

use std::sync::Arc;

use chrono::Duration;
use common::{harness, harness_with, register_request, GatedStore, RecordingNotifier, Sent};
use scholarship_auth::{
    config::AuthConfig,
    errors::{CommonError, LifecycleError},
    lifecycle::VerificationOutcome,
    services::database::{AccountStatus, CredentialStore},
    utils::{clock::Clock, crypto::CredentialHasher},
};

#[tokio::test]
async fn registration_creates_pending_account_with_one_day_token() {
    let h = harness();

    let account = h
        .lifecycle
        .register(register_request("  Somchai.J@NU.ac.th "))
        .await
        .unwrap();

    assert_eq!(account.email, "somchai.j@nu.ac.th");
    assert_eq!(account.status, AccountStatus::Pending);
    assert!(!account.is_verified());

    let digest = account.password_digest.clone().unwrap();
    assert_ne!(digest, "scholar2025");
    assert!(h.hasher.verify("scholar2025", &digest).unwrap());

    let profile = h.store.profile(&account.id).unwrap();
    assert_eq!(profile.first_name, "Somchai");
    assert_eq!(profile.student_id.as_deref(), Some("64012345"));

    let tokens = h.store.verification_tokens_for(&account.id);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].expires_at - tokens[0].created_at, Duration::hours(24));

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(&sent[0], Sent::Verification { to, .. } if to == "somchai.j@nu.ac.th"));
}

#[tokio::test]
async fn stored_token_is_not_the_emailed_token() {
    let h = harness();

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let token = h.notifier.last_verification_token().unwrap();

    let stored = h.store.verification_tokens_for(&account.id);
    assert_ne!(stored[0].token_hash, token);
    assert!(h.store.find_verification_token(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let h = harness();

    h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let result = h.lifecycle.register(register_request("A@NU.AC.TH")).await;

    assert!(matches!(result, Err(LifecycleError::DuplicateEmail)));
}

#[tokio::test]
async fn invalid_fields_are_rejected_before_anything_is_stored() {
    let h = harness();

    let mut weak = register_request("a@nu.ac.th");
    weak.password = String::from("short1");
    let mut blank = register_request("b@nu.ac.th");
    blank.first_name = String::from("   ");
    let mut bad_id = register_request("c@nu.ac.th");
    bad_id.student_id = Some(String::from("64-0123"));

    for request in [weak, blank, bad_id, register_request("not-an-email")] {
        let result = h.lifecycle.register(request).await;
        assert!(matches!(
            result,
            Err(LifecycleError::Common(CommonError::Validation(_)))
        ));
    }

    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn email_domain_must_be_allowed() {
    let config = AuthConfig {
        allowed_email_domains: vec![String::from("nu.ac.th")],
        ..AuthConfig::default()
    };
    let h = harness_with(config, RecordingNotifier::default());

    let outsider = h.lifecycle.register(register_request("someone@gmail.com")).await;
    assert!(matches!(
        outsider,
        Err(LifecycleError::Common(CommonError::Validation(_)))
    ));

    h.lifecycle
        .register(register_request("student@mail.nu.ac.th"))
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_delivery_keeps_the_account() {
    let h = harness_with(AuthConfig::default(), RecordingNotifier::failing());

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();

    assert!(h.store.account(&account.id).is_some());
    assert_eq!(h.store.verification_tokens_for(&account.id).len(), 1);
}

#[tokio::test]
async fn verification_is_idempotent() {
    let h = harness();

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let token = h.notifier.last_verification_token().unwrap();

    let first = h.lifecycle.verify_email(&token).await.unwrap();
    assert_eq!(first, VerificationOutcome::Verified);

    let stored = h.store.account(&account.id).unwrap();
    assert_eq!(stored.status, AccountStatus::Verified);
    assert_eq!(stored.email_verified_at, Some(h.clock.now()));
    assert!(h.store.verification_tokens_for(&account.id).is_empty());

    // The token is gone, so a replay is indistinguishable from a forged token.
    let replay = h.lifecycle.verify_email(&token).await;
    assert!(matches!(replay, Err(LifecycleError::InvalidToken)));
}

#[tokio::test]
async fn token_for_an_already_verified_account_is_consumed() {
    let h = harness();

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let first = h.notifier.last_verification_token().unwrap();

    // A second, still-live token outlives the first verification.
    let mut second = h.store.verification_tokens_for(&account.id).remove(0);
    second.token_hash = scholarship_auth::utils::crypto::hash_token("second-token");
    h.lifecycle.verify_email(&first).await.unwrap();
    h.store.replace_verification_tokens(&second).await.unwrap();

    let outcome = h.lifecycle.verify_email("second-token").await.unwrap();

    assert_eq!(outcome, VerificationOutcome::AlreadyVerified);
    assert!(h.store.verification_tokens_for(&account.id).is_empty());
}

#[tokio::test]
async fn expired_token_is_reported_then_removed() {
    let h = harness();

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let token = h.notifier.last_verification_token().unwrap();

    h.clock.advance(Duration::hours(24));

    let expired = h.lifecycle.verify_email(&token).await;
    assert!(matches!(expired, Err(LifecycleError::ExpiredToken)));
    assert!(h.store.verification_tokens_for(&account.id).is_empty());

    let again = h.lifecycle.verify_email(&token).await;
    assert!(matches!(again, Err(LifecycleError::InvalidToken)));

    assert!(!h.store.account(&account.id).unwrap().is_verified());
}

#[tokio::test]
async fn unknown_token_is_invalid() {
    let h = harness();

    let result = h.lifecycle.verify_email("made-up-token").await;

    assert!(matches!(result, Err(LifecycleError::InvalidToken)));
}

#[tokio::test]
async fn resend_replaces_the_previous_token() {
    let h = harness();

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let original = h.notifier.last_verification_token().unwrap();

    h.lifecycle.resend_verification("a@nu.ac.th").await.unwrap();
    let fresh = h.notifier.last_verification_token().unwrap();

    assert_ne!(original, fresh);
    assert_eq!(h.store.verification_tokens_for(&account.id).len(), 1);
    assert!(matches!(
        h.lifecycle.verify_email(&original).await,
        Err(LifecycleError::InvalidToken)
    ));
    assert_eq!(
        h.lifecycle.verify_email(&fresh).await.unwrap(),
        VerificationOutcome::Verified
    );
}

#[tokio::test]
async fn resend_is_silent_for_unknown_and_verified_accounts() {
    let h = harness();

    h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let token = h.notifier.last_verification_token().unwrap();
    h.lifecycle.verify_email(&token).await.unwrap();

    h.lifecycle.resend_verification("a@nu.ac.th").await.unwrap();
    h.lifecycle.resend_verification("nobody@nu.ac.th").await.unwrap();

    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn resend_is_rate_limited() {
    let h = harness();

    h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();

    for _ in 0..3 {
        h.lifecycle.resend_verification("a@nu.ac.th").await.unwrap();
    }

    let limited = h.lifecycle.resend_verification("a@nu.ac.th").await;
    assert!(matches!(
        limited,
        Err(LifecycleError::RateLimited { retry_after_seconds }) if retry_after_seconds == 600
    ));
}

#[tokio::test]
async fn overlapping_verifications_set_the_timestamp_once() {
    let h = harness();

    let account = h.lifecycle.register(register_request("a@nu.ac.th")).await.unwrap();
    let token = h.notifier.last_verification_token().unwrap();
    let registered_at = h.clock.now();

    let gated = h.lifecycle_over(Arc::new(GatedStore::new(h.store.clone(), 2)));
    let (first, second) = tokio::join!(gated.verify_email(&token), async {
        h.clock.advance(Duration::minutes(1));
        gated.verify_email(&token).await
    });

    let outcomes = [first, second];
    let verified = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Ok(VerificationOutcome::Verified)))
        .count();
    let repeated = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Ok(VerificationOutcome::AlreadyVerified) | Err(LifecycleError::InvalidToken)
            )
        })
        .count();
    assert_eq!((verified, repeated), (1, 1));

    // Only the winning call, made after the clock moved, wrote the timestamp.
    let stored = h.store.account(&account.id).unwrap();
    assert_eq!(stored.status, AccountStatus::Verified);
    assert_eq!(stored.email_verified_at, Some(registered_at + Duration::minutes(1)));
    assert!(h.store.verification_tokens_for(&account.id).is_empty());
}
