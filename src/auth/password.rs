use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use thiserror::Error;
use tracing::error;

use crate::config::HashingConfig;

const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Salted one-way password hashing backed by Argon2id.
///
/// The stored hash is always Argon2id over `password‖salt`, where `salt` is the
/// account's own random string. The same salt also seeds the PHC salt, so
/// hashing a given pair is deterministic.
#[derive(Clone)]
pub struct CredentialManager {
    argon2: Argon2<'static>,
}

impl CredentialManager {
    pub fn new(cfg: &HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Fresh per-account salt.
    pub fn generate_salt() -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect()
    }

    pub fn hash_password(&self, password: &str, salt: &str) -> Result<String, CredentialError> {
        let phc_salt = SaltString::encode_b64(salt.as_bytes()).map_err(|e| {
            error!(error = %e, "argon2 salt encode error");
            CredentialError::Hashing(e.to_string())
        })?;
        let input = salted(password, salt);
        let hash = self
            .argon2
            .hash_password(input.as_bytes(), &phc_salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                CredentialError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Returns `Ok(false)` on mismatch; only an unparsable stored hash is an error.
    pub fn verify_password(
        &self,
        password: &str,
        salt: &str,
        hash: &str,
    ) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            CredentialError::Hashing(e.to_string())
        })?;
        let input = salted(password, salt);
        Ok(self
            .argon2
            .verify_password(input.as_bytes(), &parsed)
            .is_ok())
    }

    /// Hashes on the blocking pool so request workers are not stalled.
    pub async fn hash_password_blocking(
        &self,
        password: String,
        salt: String,
    ) -> Result<String, CredentialError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.hash_password(&password, &salt))
            .await
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
    }

    pub async fn verify_password_blocking(
        &self,
        password: String,
        salt: String,
        hash: String,
    ) -> Result<bool, CredentialError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.verify_password(&password, &salt, &hash))
            .await
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
    }
}

fn salted(password: &str, salt: &str) -> String {
    let mut input = String::with_capacity(password.len() + salt.len());
    input.push_str(password);
    input.push_str(salt);
    input
}
