pub const ACCOUNT_SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS account SCHEMAFULL;

    DEFINE FIELD IF NOT EXISTS email ON TABLE account TYPE string;
    DEFINE FIELD IF NOT EXISTS password_digest ON TABLE account TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS email_verified_at ON TABLE account TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS role ON TABLE account TYPE string;
    DEFINE FIELD IF NOT EXISTS status ON TABLE account TYPE string;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE account TYPE datetime;

    DEFINE INDEX IF NOT EXISTS account_email ON TABLE account FIELDS email UNIQUE;
"#;

pub const PROFILE_SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS profile SCHEMAFULL;

    DEFINE FIELD IF NOT EXISTS first_name ON TABLE profile TYPE string;
    DEFINE FIELD IF NOT EXISTS last_name ON TABLE profile TYPE string;
    DEFINE FIELD IF NOT EXISTS student_id ON TABLE profile TYPE option<string>;

    DEFINE FIELD IF NOT EXISTS account ON TABLE profile TYPE record<account>;
    DEFINE INDEX IF NOT EXISTS profile_account ON TABLE profile FIELDS account UNIQUE;
"#;

pub const VERIFICATION_TOKEN_SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS verification_token SCHEMAFULL;

    DEFINE FIELD IF NOT EXISTS created_at ON TABLE verification_token TYPE datetime;
    DEFINE FIELD IF NOT EXISTS expires_at ON TABLE verification_token TYPE datetime;

    DEFINE FIELD IF NOT EXISTS account ON TABLE verification_token TYPE record<account>;
    DEFINE INDEX IF NOT EXISTS verification_token_account ON TABLE verification_token FIELDS account;
"#;

pub const PASSWORD_RESET_TOKEN_SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS password_reset_token SCHEMAFULL;

    DEFINE FIELD IF NOT EXISTS created_at ON TABLE password_reset_token TYPE datetime;
    DEFINE FIELD IF NOT EXISTS expires_at ON TABLE password_reset_token TYPE datetime;

    DEFINE FIELD IF NOT EXISTS account ON TABLE password_reset_token TYPE record<account>;
    DEFINE INDEX IF NOT EXISTS password_reset_token_account ON TABLE password_reset_token FIELDS account;
"#;

pub const SESSION_SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS session SCHEMAFULL;

    DEFINE FIELD IF NOT EXISTS created_at ON TABLE session TYPE datetime;
    DEFINE FIELD IF NOT EXISTS expires_at ON TABLE session TYPE datetime;

    DEFINE FIELD IF NOT EXISTS account ON TABLE session TYPE record<account>;
"#;

pub fn all() -> Vec<&'static str> {
    vec![
        ACCOUNT_SCHEMA,
        PROFILE_SCHEMA,
        VERIFICATION_TOKEN_SCHEMA,
        PASSWORD_RESET_TOKEN_SCHEMA,
        SESSION_SCHEMA,
    ]
}
