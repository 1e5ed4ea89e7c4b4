//! Password hashing primitives (argon2id, salted).

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use khata_core::{DomainError, DomainResult};

/// Hash a secret with argon2id and a fresh random salt.
///
/// The returned PHC string embeds algorithm, parameters, and salt.
pub fn hash_password(secret: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| DomainError::invalid_input(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored PHC hash string.
///
/// Returns `Unauthorized` on mismatch; an unparsable stored hash is also
/// `Unauthorized` (a corrupt credential must never authenticate).
pub fn verify_password(secret: &str, stored_hash: &str) -> DomainResult<()> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| DomainError::Unauthorized)?;
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .map_err(|_| DomainError::Unauthorized)
}
