use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::AuthConfig, state::AppState};

/// JWT payload: the identity claim plus issuance metadata. Deliberately
/// minimal, never the email, name or anything else personally identifying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Holds the HS256 signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let AuthConfig {
            secret,
            token_ttl_minutes,
        } = state.config.auth.clone();
        Self::new(
            secret.as_bytes(),
            Duration::from_secs((token_ttl_minutes as u64) * 60),
        )
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Stateless: the token itself is the session, nothing is stored server-side.
    pub fn sign(&self, user_id: Uuid, role: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, role = %role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let mut validation = Validation::default();
        // expiry is exact, no grace window
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Malformed,
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn sign_and_verify_roundtrips_the_claim() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "admin").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "user".into(),
            iat: now - 3700,
            exp: now - 100,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token).unwrap_err(), VerifyError::Expired);
    }

    #[test]
    fn token_within_lifetime_still_verifies() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "user".into(),
            iat: now - 3500,
            exp: now + 100,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn tampered_signature_is_malformed_never_valid() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4(), "user").expect("sign");
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("utf8");
        assert_eq!(keys.verify(&tampered).unwrap_err(), VerifyError::Malformed);
    }

    #[test]
    fn tampered_payload_is_malformed() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4(), "user").expect("sign");
        let mut parts: Vec<&str> = token.split('.').collect();
        // payload of a token claiming the admin role, signed with nothing
        let forged = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: Uuid::new_v4(),
                role: "admin".into(),
                iat: 0,
                exp: usize::MAX / 2,
            },
            &EncodingKey::from_secret(b"other-secret"),
        )
        .expect("encode");
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];
        let spliced = parts.join(".");
        assert_eq!(keys.verify(&spliced).unwrap_err(), VerifyError::Malformed);
    }

    #[tokio::test]
    async fn keys_from_app_state_carry_the_configured_ttl() {
        let state = crate::state::AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign(Uuid::new_v4(), "user").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = make_keys();
        assert_eq!(
            keys.verify("not-a-token").unwrap_err(),
            VerifyError::Malformed
        );
    }

    #[test]
    fn different_secret_does_not_verify() {
        let keys = make_keys();
        let other = JwtKeys::new(b"other-secret", Duration::from_secs(3600));
        let token = keys.sign(Uuid::new_v4(), "user").expect("sign");
        assert_eq!(other.verify(&token).unwrap_err(), VerifyError::Malformed);
    }
}
