use async_trait::async_trait;

use khata_core::{CustomerCode, CustomerId, OwnerId, ShopCode};
use khata_identity::{Customer, NewCustomer, NewOwner, Owner, PendingOtp};
use khata_ledger::{Amount, CustomerSummary, LedgerEntry, Statement};

use crate::error::StoreError;

/// The persistent store contract for the ledger core.
///
/// Every read/write is scoped by owner; implementations must make the two
/// hazardous units atomic:
///
/// 1. `post_transaction` — the entry append and the balance increment succeed
///    or fail together, and concurrent posts to one customer never lose an
///    update.
/// 2. `create_customer` — code allocation for one owner is serialized, so
///    concurrent creates never produce a duplicate `customer_code`; a
///    collision that survives anyway surfaces as `Conflict`, never a silent
///    second customer.
#[async_trait]
pub trait Store: Send + Sync {
    // Owners

    async fn create_owner(&self, new: NewOwner) -> Result<Owner, StoreError>;

    async fn find_owner(&self, id: OwnerId) -> Result<Option<Owner>, StoreError>;

    async fn find_owner_by_email(&self, email: &str) -> Result<Option<Owner>, StoreError>;

    // Customers

    /// Create a customer and allocate its per-owner code.
    async fn create_customer(
        &self,
        owner_id: OwnerId,
        new: NewCustomer,
    ) -> Result<Customer, StoreError>;

    /// All customers for an owner with balances, newest first.
    async fn list_customers(&self, owner_id: OwnerId) -> Result<Vec<CustomerSummary>, StoreError>;

    async fn find_customer_by_owner_and_code(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
    ) -> Result<Option<Customer>, StoreError>;

    /// Customer login path: resolve through the globally-unique shop code.
    async fn find_customer_by_shop_and_code(
        &self,
        shop_code: &ShopCode,
        code: &CustomerCode,
    ) -> Result<Option<Customer>, StoreError>;

    async fn find_customer(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, StoreError>;

    async fn update_customer_password(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
        password_hash: String,
    ) -> Result<(), StoreError>;

    // Ledger

    /// Append a transaction and bump the customer's balance as one atomic unit.
    async fn post_transaction(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
        amount: Amount,
        note: Option<String>,
    ) -> Result<LedgerEntry, StoreError>;

    /// Statement for `(owner, code)`: identity, balance, entries newest first.
    async fn customer_statement(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
    ) -> Result<Statement, StoreError>;

    /// Statement addressed by customer id (the customer-facing read path).
    async fn customer_statement_by_id(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Statement, StoreError>;

    // Pending login codes (one per email, replaced on re-request)

    async fn put_login_otp(&self, pending: PendingOtp) -> Result<(), StoreError>;

    async fn get_login_otp(&self, email: &str) -> Result<Option<PendingOtp>, StoreError>;

    async fn delete_login_otp(&self, email: &str) -> Result<(), StoreError>;
}
