use khata_core::{CustomerId, OwnerId};

/// Owner context for a request.
///
/// Inserted by the owner auth middleware; must be present for all
/// owner-facing routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    owner_id: OwnerId,
}

impl OwnerContext {
    pub fn new(owner_id: OwnerId) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

/// Customer context for a request (always carries the owning shop's scope).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CustomerContext {
    customer_id: CustomerId,
    owner_id: OwnerId,
}

impl CustomerContext {
    pub fn new(customer_id: CustomerId, owner_id: OwnerId) -> Self {
        Self {
            customer_id,
            owner_id,
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}
