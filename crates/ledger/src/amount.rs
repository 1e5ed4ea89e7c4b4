//! Signed, non-zero transaction amounts.

use serde::{Deserialize, Serialize};

use khata_core::{DomainError, DomainResult};

/// A signed transaction amount in integer units.
///
/// Invariant: never zero. A zero-amount transaction is meaningless and is
/// rejected at construction, so no other layer needs to re-check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub fn new(units: i64) -> DomainResult<Self> {
        if units == 0 {
            return Err(DomainError::invalid_input("amount must be non-zero"));
        }
        Ok(Self(units))
    }

    pub fn units(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<i64> for Amount {
    type Error = DomainError;

    fn try_from(units: i64) -> Result<Self, Self::Error> {
        Self::new(units)
    }
}
