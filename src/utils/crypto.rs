use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use data_encoding::BASE32_NOPAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// One-way password digest capability.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error>;

    fn verify(&self, password: &str, digest: &str) -> Result<bool, argon2::password_hash::Error>;
}

/// Argon2id hasher. Production uses the crate defaults; tests can dial the cost down.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, argon2::Error> {
        let params = Params::new(m_cost, t_cost, p_cost, None)?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self.argon2().hash_password(password.as_bytes(), &salt)?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, argon2::password_hash::Error> {
        let hash = PasswordHash::new(digest)?;

        match self.argon2().verify_password(password.as_bytes(), &hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub fn generate_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Random URL-safe token handed to the user. Only its digest is ever stored.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];

    rand::thread_rng().fill_bytes(&mut bytes);

    BASE32_NOPAD.encode(&bytes).to_lowercase()
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();

    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
