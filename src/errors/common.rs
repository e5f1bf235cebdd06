use derive_more::Display;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display("database error: {_0}")]
    Database(surrealdb::Error),
    #[display("unique constraint violated: {_0}")]
    Conflict(String),
    #[display("store unavailable: {_0}")]
    Unavailable(String),
    /// The token a unit of work was meant to consume no longer exists.
    #[display("token already consumed")]
    TokenConsumed,
}

/// Raised with `THROW` inside SurrealQL transactions when the token row is gone.
pub const TOKEN_CONSUMED: &str = "token_consumed";

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<surrealdb::Error> for StoreError {
    fn from(error: surrealdb::Error) -> Self {
        // SurrealDB reports unique index violations as "Database index `...` already contains ..."
        let message = error.to_string();
        if message.contains(TOKEN_CONSUMED) {
            return StoreError::TokenConsumed;
        }
        if message.contains("already contains") {
            return StoreError::Conflict(message);
        }

        StoreError::Database(error)
    }
}

#[derive(Debug, Display)]
pub enum CommonError {
    #[display("validation failed: {_0}")]
    Validation(validator::ValidationErrors),
    /// The body could not be read as the expected JSON payload.
    #[display("malformed request body: {_0}")]
    MalformedBody(String),
    #[display("{_0}")]
    Store(StoreError),
    #[display("hashing failed: {_0}")]
    Hashing(argon2::password_hash::Error),
}
