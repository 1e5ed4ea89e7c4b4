use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use khata_core::{CustomerId, OwnerId};

/// Who a verified session speaks for.
///
/// Owners act on their whole shop; customers act read-mostly on their own
/// account and always carry the owning shop for scoping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    Owner { owner_id: OwnerId },
    Customer { customer_id: CustomerId, owner_id: OwnerId },
}

impl Principal {
    /// The tenant scope every store call must be bounded by.
    pub fn owner_id(&self) -> OwnerId {
        match self {
            Principal::Owner { owner_id } => *owner_id,
            Principal::Customer { owner_id, .. } => *owner_id,
        }
    }
}

/// Session claims model (transport-agnostic).
///
/// This is the minimal set of claims the API expects once a token has been
/// decoded/verified by the signing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::token`].
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
