use surrealdb::{engine::remote::ws::Client, sql::Datetime, Surreal};

use super::{models::StoredToken, TokenRecord};

#[derive(Clone)]
pub struct SessionQuery<'a> {
    db: &'a Surreal<Client>,
}

impl<'a> SessionQuery<'a> {
    pub(crate) fn new(db: &'a Surreal<Client>) -> Self {
        Self { db }
    }
}

impl<'a> SessionQuery<'a> {
    pub async fn create(&self, session: &StoredToken) -> Result<(), surrealdb::Error> {
        let query = r#"
            CREATE type::thing("session", $id) SET
                account = type::thing("account", $account_id),
                created_at = $created_at,
                expires_at = $expires_at
        "#;

        self.db
            .query(query)
            .bind(("id", session.token_hash.clone()))
            .bind(("account_id", session.account_id.as_str().to_owned()))
            .bind(("created_at", Datetime::from(session.created_at)))
            .bind(("expires_at", Datetime::from(session.expires_at)))
            .await?
            .check()?;

        Ok(())
    }

    pub async fn get(&self, token_hash: &str) -> Result<Option<StoredToken>, surrealdb::Error> {
        let record: Option<TokenRecord> = self
            .db
            .select(("session", token_hash.to_owned()))
            .await?;

        Ok(record.map(StoredToken::from))
    }

    pub async fn remove(&self, token_hash: &str) -> Result<(), surrealdb::Error> {
        let _: Option<TokenRecord> = self.db.delete(("session", token_hash.to_owned())).await?;

        Ok(())
    }
}
