//! HS256 bearer tokens over [`SessionClaims`].

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::{validate_claims, Principal, SessionClaims, TokenValidationError};

/// Default session lifetime.
pub fn session_ttl() -> Duration {
    Duration::hours(8)
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("token is malformed or has a bad signature")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Wire form of the claims: JWT-conventional integer timestamps.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    #[serde(flatten)]
    principal: Principal,
    iat: i64,
    exp: i64,
}

/// HS256 signer/verifier for session tokens.
///
/// Time-window checks are done by [`validate_claims`] against the caller's
/// clock (deterministic, testable); the jsonwebtoken built-in expiry check is
/// disabled so there is exactly one source of truth.
pub struct Hs256SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256SessionSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token for `principal`, valid from `now` for [`session_ttl`].
    pub fn issue(&self, principal: Principal, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = WireClaims {
            principal,
            iat: now.timestamp(),
            exp: (now + session_ttl()).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and time window; returns the decoded claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        let claims = SessionClaims {
            principal: data.claims.principal,
            issued_at: Utc
                .timestamp_opt(data.claims.iat, 0)
                .single()
                .ok_or(TokenError::Invalid)?,
            expires_at: Utc
                .timestamp_opt(data.claims.exp, 0)
                .single()
                .ok_or(TokenError::Invalid)?,
        };
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khata_core::{CustomerId, OwnerId};

    fn signer() -> Hs256SessionSigner {
        Hs256SessionSigner::new(b"test-secret")
    }

    #[test]
    fn issue_then_verify_round_trips_owner_principal() {
        let now = Utc::now();
        let owner_id = OwnerId::new();
        let token = signer()
            .issue(Principal::Owner { owner_id }, now)
            .unwrap();

        let claims = signer().verify(&token, now).unwrap();
        assert_eq!(claims.principal, Principal::Owner { owner_id });
    }

    #[test]
    fn customer_principal_carries_owner_scope() {
        let now = Utc::now();
        let customer_id = CustomerId::new();
        let owner_id = OwnerId::new();
        let token = signer()
            .issue(Principal::Customer { customer_id, owner_id }, now)
            .unwrap();

        let claims = signer().verify(&token, now).unwrap();
        assert_eq!(claims.principal.owner_id(), owner_id);
    }

    #[test]
    fn expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(9);
        let token = signer()
            .issue(Principal::Owner { owner_id: OwnerId::new() }, issued)
            .unwrap();

        let err = signer().verify(&token, Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = Utc::now();
        let token = signer()
            .issue(Principal::Owner { owner_id: OwnerId::new() }, now)
            .unwrap();

        let other = Hs256SessionSigner::new(b"different-secret");
        assert!(matches!(other.verify(&token, now), Err(TokenError::Invalid)));
    }
}
