use serde::{Deserialize, Serialize};
use surrealdb::{
    engine::remote::ws::Client,
    sql::{Datetime, Thing},
    Surreal,
};

use super::models::{Account, AccountId, AccountStatus, Profile, Role, StoredToken};

#[derive(Serialize, Deserialize, Debug, Clone)]
struct AccountRecord {
    id: Thing,
    email: String,
    password_digest: Option<String>,
    email_verified_at: Option<Datetime>,
    role: Role,
    status: AccountStatus,
    created_at: Datetime,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Account {
            id: AccountId(record.id.id.to_raw()),
            email: record.email,
            password_digest: record.password_digest,
            email_verified_at: record.email_verified_at.map(|at| at.0),
            role: record.role,
            status: record.status,
            created_at: record.created_at.0,
        }
    }
}

#[derive(Clone)]
pub struct AccountQuery<'a> {
    db: &'a Surreal<Client>,
}

impl<'a> AccountQuery<'a> {
    pub(crate) fn new(db: &'a Surreal<Client>) -> Self {
        Self { db }
    }
}

impl<'a> AccountQuery<'a> {
    pub async fn get(&self, account_id: &AccountId) -> Result<Option<Account>, surrealdb::Error> {
        let record: Option<AccountRecord> = self
            .db
            .select(("account", account_id.as_str().to_owned()))
            .await?;

        Ok(record.map(Account::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>, surrealdb::Error> {
        let query = r#"
            SELECT * FROM account
            WHERE email = $email
            LIMIT 1
        "#;

        let mut response: surrealdb::Response = self
            .db
            .query(query)
            .bind(("email", email.to_owned()))
            .await?;

        let result: Vec<AccountRecord> = response.take(0)?;

        Ok(result.into_iter().next().map(Account::from))
    }

    pub async fn create_with_verification(
        &self,
        account: &Account,
        profile: &Profile,
        verification_token: &StoredToken,
    ) -> Result<(), surrealdb::Error> {
        let query = r#"
            BEGIN TRANSACTION;

            CREATE type::thing("account", $account_id) SET
                email = $email,
                password_digest = $password_digest,
                email_verified_at = NONE,
                role = $role,
                status = $status,
                created_at = $created_at;

            CREATE profile SET
                account = type::thing("account", $account_id),
                first_name = $first_name,
                last_name = $last_name,
                student_id = $student_id;

            CREATE type::thing("verification_token", $token_hash) SET
                account = type::thing("account", $account_id),
                created_at = $token_created_at,
                expires_at = $token_expires_at;

            COMMIT TRANSACTION;
        "#;

        self.db
            .query(query)
            .bind(("account_id", account.id.as_str().to_owned()))
            .bind(("email", account.email.clone()))
            .bind(("password_digest", account.password_digest.clone()))
            .bind(("role", account.role))
            .bind(("status", account.status))
            .bind(("created_at", Datetime::from(account.created_at)))
            .bind(("first_name", profile.first_name.clone()))
            .bind(("last_name", profile.last_name.clone()))
            .bind(("student_id", profile.student_id.clone()))
            .bind(("token_hash", verification_token.token_hash.clone()))
            .bind((
                "token_created_at",
                Datetime::from(verification_token.created_at),
            ))
            .bind((
                "token_expires_at",
                Datetime::from(verification_token.expires_at),
            ))
            .await?
            .check()?;

        Ok(())
    }

    pub async fn update_password(
        &self,
        account_id: &AccountId,
        password_digest: &str,
    ) -> Result<(), surrealdb::Error> {
        let query = r#"
            UPDATE type::thing("account", $account_id)
            SET password_digest = $password_digest
        "#;

        self.db
            .query(query)
            .bind(("account_id", account_id.as_str().to_owned()))
            .bind(("password_digest", password_digest.to_owned()))
            .await?
            .check()?;

        Ok(())
    }
}
