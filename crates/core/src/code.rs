//! Human-readable codes: per-owner customer codes and global shop codes.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Customer code, unique **within one owner's customer set** (never globally).
///
/// Shape: `C` + zero-padded sequence number, 3 digits minimum (`C001`,
/// `C042`, `C104`, `C1000` for the 1000th customer). Assigned once at
/// creation, never reused or changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerCode(String);

impl CustomerCode {
    /// Build the code for the `seq`-th customer of an owner (1-based).
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("C{seq:03}"))
    }

    /// Parse user input into a code: trimmed, uppercased, non-empty.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let code = input.trim().to_uppercase();
        if code.is_empty() {
            return Err(DomainError::invalid_input("customer code is empty"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CustomerCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CustomerCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Shop code, unique **across all owners**. Customers use it to locate their
/// shop at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopCode(String);

impl ShopCode {
    /// Parse user input into a shop code: trimmed, uppercased, non-empty.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let code = input.trim().to_uppercase();
        if code.is_empty() {
            return Err(DomainError::invalid_input("shop code is empty"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ShopCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShopCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
