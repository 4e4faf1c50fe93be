use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload. `sub` is the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("signing key unavailable")]
    Signing,
    #[error("token expired")]
    Expired,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Signing and verification keys. Built once from config and shared read-only.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    has_secret: bool,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = cfg;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            has_secret: !secret.is_empty(),
            issuer: issuer.clone(),
            audience: audience.clone(),
            ttl: Duration::from_secs((*ttl_minutes).max(0) as u64 * 60),
        }
    }

    pub fn sign(&self, subject: &str) -> Result<String, TokenError> {
        self.sign_at(subject, OffsetDateTime::now_utc())
    }

    fn sign_at(&self, subject: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        if !self.has_secret {
            return Err(TokenError::Signing);
        }
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)?;
        debug!(subject = %subject, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry; returns the subject.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.sign("a@b.com").expect("sign");
        assert_eq!(keys.verify(&token).expect("verify"), "a@b.com");
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let long_ago = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let token = keys.sign_at("a@b.com", long_ago).expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_expired_seconds_ago_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued = OffsetDateTime::now_utc()
            - TimeDuration::seconds(keys.ttl.as_secs() as i64)
            - TimeDuration::seconds(3);
        let token = keys.sign_at("a@b.com", issued).expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_just_before_expiry_is_accepted() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let issued = OffsetDateTime::now_utc()
            - TimeDuration::seconds(keys.ttl.as_secs() as i64)
            + TimeDuration::seconds(30);
        let token = keys.sign_at("a@b.com", issued).expect("sign");
        assert_eq!(keys.verify(&token).as_deref(), Ok("a@b.com"));
    }

    #[test]
    fn other_secret_is_invalid_signature() {
        let good = make_keys("secret-one", "iss", "aud");
        let bad = make_keys("secret-two", "iss", "aud");
        let token = good.sign("a@b.com").unwrap();
        assert_eq!(bad.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn single_character_mutation_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.sign("a@b.com").unwrap();
        let len = token.len();
        for pos in [0, len / 3, len / 2, len - 10, len - 2] {
            let mut bytes = token.clone().into_bytes();
            bytes[pos] = if bytes[pos] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(keys.verify(&mutated).is_err(), "mutation at {pos} accepted");
        }
    }

    #[test]
    fn garbage_is_malformed_not_signature() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(matches!(keys.verify("not-a-jwt"), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.sign("a@b.com").unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let keys = make_keys("", "iss", "aud");
        assert_eq!(keys.sign("a@b.com"), Err(TokenError::Signing));
    }
}
