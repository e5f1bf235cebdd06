use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[display("STUDENT")]
    Student,
    #[display("ADMIN")]
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[display("PENDING")]
    Pending,
    #[display("VERIFIED")]
    Verified,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_digest: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// What a verification unit of work did to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationCommit {
    Verified,
    /// Another token verified the account first; only this token was consumed.
    AlreadyVerified,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub student_id: Option<String>,
}

/// Verification, reset and session records all share this shape.
/// `token_hash` is the SHA-256 digest of the token the user holds and doubles as the record key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token_hash: String,
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
