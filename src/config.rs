//! Service configuration.
//!
//! Every environment variable is read here, once, at startup.

use std::{net::SocketAddr, str::FromStr};

use chrono::Duration;
use derive_more::Display;

use crate::services::rate_limiter::RateLimitPolicy;

#[derive(Debug, Display)]
pub enum ConfigError {
    #[display("missing required variable {var} ({hint})")]
    MissingRequired { var: String, hint: String },
    #[display("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Surreal,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "surreal" | "surrealdb" => Ok(StoreBackend::Surreal),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub domain: String,
    pub sender_name: String,
    /// Base URL of the web front end; links in emails point here.
    pub app_url: String,
}

/// Rules of the credential lifecycle.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Registration only accepts these email domains. Empty accepts any domain.
    pub allowed_email_domains: Vec<String>,
    pub verification_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub session_ttl: Duration,
    pub reset_rate_limit: RateLimitPolicy,
    pub verification_rate_limit: RateLimitPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_email_domains: Vec::new(),
            verification_token_ttl: Duration::hours(24),
            reset_token_ttl: Duration::hours(1),
            session_ttl: Duration::days(30),
            reset_rate_limit: RateLimitPolicy::password_reset(),
            verification_rate_limit: RateLimitPolicy::verification_resend(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = parse_or(&lookup, "SERVER_BIND", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let backend = parse_or(&lookup, "STORE_BACKEND", StoreBackend::Surreal)?;

        let database = DatabaseConfig {
            backend,
            url: lookup("SURREAL_URL").unwrap_or_else(|| String::from("127.0.0.1:8000")),
            username: lookup("SURREAL_USER").unwrap_or_else(|| String::from("root")),
            password: lookup("SURREAL_PASS").unwrap_or_else(|| String::from("root")),
            namespace: lookup("SURREAL_NAMESPACE").unwrap_or_else(|| String::from("scholarship")),
            database: lookup("SURREAL_DATABASE").unwrap_or_else(|| String::from("portal")),
        };

        let api_key = match (lookup("RESEND_API_KEY"), backend) {
            (Some(key), _) => key,
            (None, StoreBackend::Memory) => String::new(),
            (None, StoreBackend::Surreal) => {
                return Err(ConfigError::MissingRequired {
                    var: String::from("RESEND_API_KEY"),
                    hint: String::from("create one in the Resend dashboard"),
                })
            }
        };

        let email = EmailConfig {
            api_key,
            domain: lookup("EMAIL_DOMAIN").unwrap_or_else(|| String::from("localhost")),
            sender_name: lookup("EMAIL_SENDER_NAME")
                .unwrap_or_else(|| String::from("Scholarship Portal")),
            app_url: lookup("APP_URL").unwrap_or_else(|| String::from("http://localhost:3000")),
        };

        let allowed_email_domains = lookup("ALLOWED_EMAIL_DOMAINS")
            .map(|domains| {
                domains
                    .split(',')
                    .map(|domain| domain.trim().trim_start_matches('@').to_lowercase())
                    .filter(|domain| !domain.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let defaults = AuthConfig::default();

        let auth = AuthConfig {
            allowed_email_domains,
            verification_token_ttl: Duration::hours(parse_or(
                &lookup,
                "VERIFICATION_TOKEN_TTL_HOURS",
                defaults.verification_token_ttl.num_hours(),
            )?),
            reset_token_ttl: Duration::minutes(parse_or(
                &lookup,
                "RESET_TOKEN_TTL_MINUTES",
                defaults.reset_token_ttl.num_minutes(),
            )?),
            session_ttl: Duration::days(parse_or(
                &lookup,
                "SESSION_TTL_DAYS",
                defaults.session_ttl.num_days(),
            )?),
            reset_rate_limit: RateLimitPolicy::new(
                parse_or(
                    &lookup,
                    "RATE_LIMIT_RESET_ATTEMPTS",
                    defaults.reset_rate_limit.max_attempts,
                )?,
                Duration::seconds(parse_or(
                    &lookup,
                    "RATE_LIMIT_RESET_WINDOW_SECS",
                    defaults.reset_rate_limit.window.num_seconds(),
                )?),
            ),
            verification_rate_limit: RateLimitPolicy::new(
                parse_or(
                    &lookup,
                    "RATE_LIMIT_VERIFY_ATTEMPTS",
                    defaults.verification_rate_limit.max_attempts,
                )?,
                Duration::seconds(parse_or(
                    &lookup,
                    "RATE_LIMIT_VERIFY_WINDOW_SECS",
                    defaults.verification_rate_limit.window.num_seconds(),
                )?),
            ),
        };

        Ok(Self {
            bind,
            database,
            email,
            auth,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            value: value.clone(),
            reason: e.to_string(),
        }),
    }
}
