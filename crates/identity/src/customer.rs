use serde::{Deserialize, Serialize};

use khata_core::{CustomerCode, CustomerId, DomainError, DomainResult, OwnerId};

use crate::password::hash_password;

/// Shortest password the original surface accepts.
pub const MIN_PASSWORD_LEN: usize = 4;

/// A customer record under exactly one owner.
///
/// `(owner_id, customer_code)` is unique; the code is assigned once at
/// creation and never reused or changed. `balance` is the denormalized
/// running total the store keeps consistent with the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub owner_id: OwnerId,
    pub customer_code: CustomerCode,
    pub name: String,
    pub password_hash: String,
    pub balance: i64,
}

/// Validated input for customer creation. The customer code is *not* part of
/// this input — the store allocates it at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub password_hash: String,
}

impl NewCustomer {
    pub fn new(name: &str, password: &str) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("name cannot be empty"));
        }
        validate_password(password)?;
        Ok(Self {
            name: name.to_string(),
            password_hash: hash_password(password)?,
        })
    }
}

/// Shared password policy for creation and change.
pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::invalid_input(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
