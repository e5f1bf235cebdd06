pub mod account;
pub mod memory;
pub mod models;
pub mod password_reset_token;
pub mod session;
pub mod verification_token;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    engine::remote::ws::{Client, Ws},
    opt::auth::Root,
    sql::{Datetime, Thing},
    Surreal,
};

use crate::{config::DatabaseConfig, errors::StoreError};

pub use memory::MemoryStore;
pub use models::{
    Account, AccountId, AccountStatus, Profile, Role, StoredToken, VerificationCommit,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable state behind the credential lifecycle.
///
/// Every method that touches more than one record is a single unit of work: either all of
/// its writes become visible or none do.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn find_account(&self, account_id: &AccountId) -> StoreResult<Option<Account>>;

    /// Creates the account, its profile and its first verification token.
    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    async fn create_registration(
        &self,
        account: &Account,
        profile: &Profile,
        verification_token: &StoredToken,
    ) -> StoreResult<()>;

    async fn update_password(&self, account_id: &AccountId, password_digest: &str)
        -> StoreResult<()>;

    async fn find_verification_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>>;

    async fn delete_verification_token(&self, token_hash: &str) -> StoreResult<()>;

    /// Deletes every verification token of the owning account, then creates `token`.
    async fn replace_verification_tokens(&self, token: &StoredToken) -> StoreResult<()>;

    /// Consumes the token and marks the account verified unless it already is.
    /// Fails with [`StoreError::TokenConsumed`] when the token is gone, leaving the account as is.
    async fn complete_verification(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        verified_at: DateTime<Utc>,
    ) -> StoreResult<VerificationCommit>;

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>>;

    async fn delete_reset_token(&self, token_hash: &str) -> StoreResult<()>;

    /// Deletes every reset token of the owning account, then creates `token`.
    async fn replace_reset_tokens(&self, token: &StoredToken) -> StoreResult<()>;

    /// Consumes the token and stores the new digest.
    /// Fails with [`StoreError::TokenConsumed`] when the token is gone, leaving the digest as is.
    async fn complete_password_reset(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        password_digest: &str,
    ) -> StoreResult<()>;

    async fn create_session(&self, session: &StoredToken) -> StoreResult<()>;

    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<StoredToken>>;

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()>;
}

/// Row shape shared by the verification, reset and session tables.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct TokenRecord {
    pub id: Thing,
    pub account: Thing,
    pub created_at: Datetime,
    pub expires_at: Datetime,
}

impl From<TokenRecord> for StoredToken {
    fn from(record: TokenRecord) -> Self {
        StoredToken {
            token_hash: record.id.id.to_raw(),
            account_id: AccountId(record.account.id.to_raw()),
            created_at: record.created_at.0,
            expires_at: record.expires_at.0,
        }
    }
}

#[derive(Clone)]
pub struct DatabaseQuery<'a> {
    pub account: account::AccountQuery<'a>,
    pub verification_token: verification_token::VerificationTokenQuery<'a>,
    pub password_reset_token: password_reset_token::PasswordResetTokenQuery<'a>,
    pub session: session::SessionQuery<'a>,
}

/// SurrealDB-backed [`CredentialStore`].
#[derive(Clone)]
pub struct DatabaseLayer {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub db: Surreal<Client>,
}

impl DatabaseLayer {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, surrealdb::Error> {
        let db = Surreal::new::<Ws>(config.url.as_str()).await?;

        db.signin(Root {
            username: config.username.as_str(),
            password: config.password.as_str(),
        })
        .await?;

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        tracing::info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connected to SurrealDB"
        );

        Ok(Self {
            url: config.url.clone(),
            namespace: config.namespace.clone(),
            database: config.database.clone(),
            db,
        })
    }

    pub async fn initialize_schemas(&self, schemas: Vec<&str>) -> Result<(), surrealdb::Error> {
        for schema_query in schemas {
            self.db.query(schema_query).await?.check()?;
        }

        Ok(())
    }

    pub fn query(&self) -> DatabaseQuery {
        DatabaseQuery {
            account: account::AccountQuery::new(&self.db),
            verification_token: verification_token::VerificationTokenQuery::new(&self.db),
            password_reset_token: password_reset_token::PasswordResetTokenQuery::new(&self.db),
            session: session::SessionQuery::new(&self.db),
        }
    }
}

#[async_trait]
impl CredentialStore for DatabaseLayer {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self.query().account.get_by_email(email).await?)
    }

    async fn find_account(&self, account_id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.query().account.get(account_id).await?)
    }

    async fn create_registration(
        &self,
        account: &Account,
        profile: &Profile,
        verification_token: &StoredToken,
    ) -> StoreResult<()> {
        self.query()
            .account
            .create_with_verification(account, profile, verification_token)
            .await
            .map_err(StoreError::from)
    }

    async fn update_password(
        &self,
        account_id: &AccountId,
        password_digest: &str,
    ) -> StoreResult<()> {
        Ok(self
            .query()
            .account
            .update_password(account_id, password_digest)
            .await?)
    }

    async fn find_verification_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        Ok(self.query().verification_token.get(token_hash).await?)
    }

    async fn delete_verification_token(&self, token_hash: &str) -> StoreResult<()> {
        Ok(self.query().verification_token.remove(token_hash).await?)
    }

    async fn replace_verification_tokens(&self, token: &StoredToken) -> StoreResult<()> {
        Ok(self.query().verification_token.replace(token).await?)
    }

    async fn complete_verification(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        verified_at: DateTime<Utc>,
    ) -> StoreResult<VerificationCommit> {
        Ok(self
            .query()
            .verification_token
            .consume(account_id, token_hash, verified_at)
            .await?)
    }

    async fn find_reset_token(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        Ok(self.query().password_reset_token.get(token_hash).await?)
    }

    async fn delete_reset_token(&self, token_hash: &str) -> StoreResult<()> {
        Ok(self.query().password_reset_token.remove(token_hash).await?)
    }

    async fn replace_reset_tokens(&self, token: &StoredToken) -> StoreResult<()> {
        Ok(self.query().password_reset_token.replace(token).await?)
    }

    async fn complete_password_reset(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        password_digest: &str,
    ) -> StoreResult<()> {
        Ok(self
            .query()
            .password_reset_token
            .consume(account_id, token_hash, password_digest)
            .await?)
    }

    async fn create_session(&self, session: &StoredToken) -> StoreResult<()> {
        Ok(self.query().session.create(session).await?)
    }

    async fn find_session(&self, token_hash: &str) -> StoreResult<Option<StoredToken>> {
        Ok(self.query().session.get(token_hash).await?)
    }

    async fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        Ok(self.query().session.remove(token_hash).await?)
    }
}
