//! One-time login codes for owner sign-in.
//!
//! Codes are 6 decimal digits, hashed at rest, and valid for [`otp_ttl`].
//! One pending code per email: a new request replaces the previous row.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use khata_core::{DomainError, DomainResult};

use crate::password::{hash_password, verify_password};

/// How long a one-time code stays valid.
pub fn otp_ttl() -> Duration {
    Duration::minutes(5)
}

/// A freshly generated one-time code.
///
/// The plaintext exists only long enough to hand to the notifier; everything
/// persisted is the hash inside [`PendingOtp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a 6-digit code (100000..=999999, so never zero-prefixed).
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The persisted form of a pending login code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOtp {
    pub email: String,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    /// Hash a code for storage, stamped to expire [`otp_ttl`] after `now`.
    pub fn issue(email: &str, code: &OtpCode, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            email: email.to_string(),
            otp_hash: hash_password(code.as_str())?,
            expires_at: now + otp_ttl(),
        })
    }

    /// Check a submitted code: must be unexpired and hash-match.
    ///
    /// Expiry and mismatch are both `Unauthorized` — the caller cannot tell
    /// which failed.
    pub fn verify(&self, submitted: &str, now: DateTime<Utc>) -> DomainResult<()> {
        if now >= self.expires_at {
            return Err(DomainError::Unauthorized);
        }
        verify_password(submitted.trim(), &self.otp_hash)
    }
}
