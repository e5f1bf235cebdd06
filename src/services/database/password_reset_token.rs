use surrealdb::{engine::remote::ws::Client, sql::Datetime, Surreal};

use super::{
    models::{AccountId, StoredToken},
    TokenRecord,
};
use crate::errors::common::TOKEN_CONSUMED;

#[derive(Clone)]
pub struct PasswordResetTokenQuery<'a> {
    db: &'a Surreal<Client>,
}

impl<'a> PasswordResetTokenQuery<'a> {
    pub(crate) fn new(db: &'a Surreal<Client>) -> Self {
        Self { db }
    }
}

impl<'a> PasswordResetTokenQuery<'a> {
    pub async fn get(&self, token_hash: &str) -> Result<Option<StoredToken>, surrealdb::Error> {
        let record: Option<TokenRecord> = self
            .db
            .select(("password_reset_token", token_hash.to_owned()))
            .await?;

        Ok(record.map(StoredToken::from))
    }

    pub async fn remove(&self, token_hash: &str) -> Result<(), surrealdb::Error> {
        let _: Option<TokenRecord> = self
            .db
            .delete(("password_reset_token", token_hash.to_owned()))
            .await?;

        Ok(())
    }

    /// The delete and the create share one transaction, so a concurrent reader never sees
    /// the account with zero or two live tokens.
    pub async fn replace(&self, token: &StoredToken) -> Result<(), surrealdb::Error> {
        let query = r#"
            BEGIN TRANSACTION;

            DELETE password_reset_token
            WHERE account = type::thing("account", $account_id);

            CREATE type::thing("password_reset_token", $token_hash) SET
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
        password_digest: &str,
    ) -> Result<(), surrealdb::Error> {
        let query = r#"
            BEGIN TRANSACTION;

            LET $consumed = (DELETE type::thing("password_reset_token", $token_hash) RETURN BEFORE);
            IF array::len($consumed) == 0 {
                THROW $token_consumed;
            };

            UPDATE type::thing("account", $account_id)
            SET password_digest = $password_digest;

            COMMIT TRANSACTION;
        "#;

        self.db
            .query(query)
            .bind(("account_id", account_id.as_str().to_owned()))
            .bind(("token_hash", token_hash.to_owned()))
            .bind(("password_digest", password_digest.to_owned()))
            .bind(("token_consumed", TOKEN_CONSUMED))
            .await?
            .check()?;

        Ok(())
    }
}
