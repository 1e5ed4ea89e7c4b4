use serde::{Deserialize, Serialize};

use khata_core::{DomainError, DomainResult, OwnerId, ShopCode};

/// Tenant root: a shop operator.
///
/// Created by the administrative bootstrap action; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub email: String,
    pub shop_code: ShopCode,
}

/// Validated input for owner creation.
///
/// Normalizes the way the bootstrap surface expects: email trimmed and
/// lowercased, shop code trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    pub email: String,
    pub shop_code: ShopCode,
}

impl NewOwner {
    pub fn new(email: &str, shop_code: &str) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::invalid_input("invalid email format"));
        }
        Ok(Self {
            email,
            shop_code: ShopCode::parse(shop_code)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_email_and_shop_code() {
        let new = NewOwner::new("  Tea.Stall@Example.COM ", "chai-01").unwrap();
        assert_eq!(new.email, "tea.stall@example.com");
        assert_eq!(new.shop_code.as_str(), "CHAI-01");
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(NewOwner::new("not-an-email", "SHOP").is_err());
        assert!(NewOwner::new("   ", "SHOP").is_err());
    }
}
