use chrono::{DateTime, Utc};
use surrealdb::{engine::remote::ws::Client, sql::Datetime, Surreal};

use super::{
    models::{AccountId, AccountStatus, StoredToken, VerificationCommit},
    TokenRecord,
};
use crate::errors::common::TOKEN_CONSUMED;

#[derive(Clone)]
pub struct VerificationTokenQuery<'a> {
    db: &'a Surreal<Client>,
}

impl<'a> VerificationTokenQuery<'a> {
    pub(crate) fn new(db: &'a Surreal<Client>) -> Self {
        Self { db }
    }
}

impl<'a> VerificationTokenQuery<'a> {
    pub async fn get(&self, token_hash: &str) -> Result<Option<StoredToken>, surrealdb::Error> {
        let record: Option<TokenRecord> = self
            .db
            .select(("verification_token", token_hash.to_owned()))
            .await?;

        Ok(record.map(StoredToken::from))
    }

    pub async fn remove(&self, token_hash: &str) -> Result<(), surrealdb::Error> {
        let _: Option<TokenRecord> = self
            .db
            .delete(("verification_token", token_hash.to_owned()))
            .await?;

        Ok(())
    }

    pub async fn replace(&self, token: &StoredToken) -> Result<(), surrealdb::Error> {
        let query = r#"
            BEGIN TRANSACTION;

            DELETE verification_token
            WHERE account = type::thing("account", $account_id);

            CREATE type::thing("verification_token", $token_hash) SET
                account = type::thing("account", $account_id),
                created_at = $created_at,
                expires_at = $expires_at;

            COMMIT TRANSACTION;
        "#;

        self.db
            .query(query)
            .bind(("account_id", token.account_id.as_str().to_owned()))
            .bind(("token_hash", token.token_hash.clone()))
            .bind(("created_at", Datetime::from(token.created_at)))
            .bind(("expires_at", Datetime::from(token.expires_at)))
            .await?
            .check()?;

        Ok(())
    }

    pub async fn consume(
        &self,
        account_id: &AccountId,
        token_hash: &str,
        verified_at: DateTime<Utc>,
    ) -> Result<VerificationCommit, surrealdb::Error> {
        let query = r#"
            BEGIN TRANSACTION;

            LET $consumed = (DELETE type::thing("verification_token", $token_hash) RETURN BEFORE);
            IF array::len($consumed) == 0 {
                THROW $token_consumed;
            };

            UPDATE type::thing("account", $account_id) SET
                email_verified_at = $verified_at,
                status = $status
            WHERE email_verified_at IS NONE;

            COMMIT TRANSACTION;

            SELECT VALUE email_verified_at FROM ONLY type::thing("account", $account_id);
        "#;

        let mut response = self
            .db
            .query(query)
            .bind(("account_id", account_id.as_str().to_owned()))
            .bind(("token_hash", token_hash.to_owned()))
            .bind(("verified_at", Datetime::from(verified_at)))
            .bind(("status", AccountStatus::Verified))
            .bind(("token_consumed", TOKEN_CONSUMED))
            .await?
            .check()?;

        // The WHERE clause leaves an earlier timestamp in place.
        let last = response.num_statements().saturating_sub(1);
        let stored: Option<Datetime> = response.take(last)?;

        match stored {
            Some(stored) if stored.0 == verified_at => Ok(VerificationCommit::Verified),
            _ => Ok(VerificationCommit::AlreadyVerified),
        }
    }
}
