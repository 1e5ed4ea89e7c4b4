//! In-memory store for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use khata_core::{CustomerCode, CustomerId, DomainError, OwnerId, ShopCode};
use khata_identity::{Customer, NewCustomer, NewOwner, Owner, PendingOtp};
use khata_ledger::{Amount, CustomerSummary, EntryView, LedgerEntry, Statement};

use crate::error::StoreError;
use crate::r#trait::Store;

#[derive(Debug, Default)]
struct State {
    owners: Vec<Owner>,
    /// Insertion order doubles as creation order (newest-first = reverse).
    customers: Vec<Customer>,
    entries: Vec<LedgerEntry>,
    next_entry_id: i64,
    otps: HashMap<String, PendingOtp>,
}

/// Mutex-guarded store.
///
/// Every operation takes the one lock for its whole duration, so the
/// append+increment unit and per-owner code allocation are serialized exactly
/// as the Postgres implementation serializes them with transactions and row
/// locks.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panic mid-operation; tests should see it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn statement_for(state: &State, customer: &Customer) -> Statement {
    let mut entries: Vec<&LedgerEntry> = state
        .entries
        .iter()
        .filter(|e| e.owner_id == customer.owner_id && e.customer_id == customer.id)
        .collect();
    entries.sort_by(|a, b| b.id.cmp(&a.id));

    Statement {
        customer_name: customer.name.clone(),
        customer_code: customer.customer_code.clone(),
        balance: customer.balance,
        entries: entries
            .into_iter()
            .map(|e| EntryView {
                amount: e.amount.units(),
                note: e.note.clone(),
                created_at: e.created_at,
            })
            .collect(),
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_owner(&self, new: NewOwner) -> Result<Owner, StoreError> {
        let mut state = self.lock();
        if state
            .owners
            .iter()
            .any(|o| o.email == new.email || o.shop_code == new.shop_code)
        {
            return Err(DomainError::conflict("email or shop code already exists").into());
        }
        let owner = Owner {
            id: OwnerId::new(),
            email: new.email,
            shop_code: new.shop_code,
        };
        state.owners.push(owner.clone());
        Ok(owner)
    }

    async fn find_owner(&self, id: OwnerId) -> Result<Option<Owner>, StoreError> {
        Ok(self.lock().owners.iter().find(|o| o.id == id).cloned())
    }

    async fn find_owner_by_email(&self, email: &str) -> Result<Option<Owner>, StoreError> {
        Ok(self
            .lock()
            .owners
            .iter()
            .find(|o| o.email == email)
            .cloned())
    }

    async fn create_customer(
        &self,
        owner_id: OwnerId,
        new: NewCustomer,
    ) -> Result<Customer, StoreError> {
        let mut state = self.lock();
        if !state.owners.iter().any(|o| o.id == owner_id) {
            return Err(DomainError::NotFound.into());
        }

        // The lock serializes creations per process, so count-based
        // allocation cannot race here; the duplicate check is the same
        // backstop the unique constraint provides in Postgres.
        let count = state
            .customers
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .count() as u64;
        let code = CustomerCode::from_sequence(count + 1);

        if state
            .customers
            .iter()
            .any(|c| c.owner_id == owner_id && c.customer_code == code)
        {
            return Err(DomainError::conflict(format!("duplicate customer code {code}")).into());
        }

        let customer = Customer {
            id: CustomerId::new(),
            owner_id,
            customer_code: code,
            name: new.name,
            password_hash: new.password_hash,
            balance: 0,
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn list_customers(&self, owner_id: OwnerId) -> Result<Vec<CustomerSummary>, StoreError> {
        Ok(self
            .lock()
            .customers
            .iter()
            .rev()
            .filter(|c| c.owner_id == owner_id)
            .map(|c| CustomerSummary {
                customer_code: c.customer_code.clone(),
                name: c.name.clone(),
                balance: c.balance,
            })
            .collect())
    }

    async fn find_customer_by_owner_and_code(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
    ) -> Result<Option<Customer>, StoreError> {
        Ok(self
            .lock()
            .customers
            .iter()
            .find(|c| c.owner_id == owner_id && &c.customer_code == code)
            .cloned())
    }

    async fn find_customer_by_shop_and_code(
        &self,
        shop_code: &ShopCode,
        code: &CustomerCode,
    ) -> Result<Option<Customer>, StoreError> {
        let state = self.lock();
        let Some(owner) = state.owners.iter().find(|o| &o.shop_code == shop_code) else {
            return Ok(None);
        };
        Ok(state
            .customers
            .iter()
            .find(|c| c.owner_id == owner.id && &c.customer_code == code)
            .cloned())
    }

    async fn find_customer(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, StoreError> {
        Ok(self
            .lock()
            .customers
            .iter()
            .find(|c| c.owner_id == owner_id && c.id == customer_id)
            .cloned())
    }

    async fn update_customer_password(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
        password_hash: String,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let customer = state
            .customers
            .iter_mut()
            .find(|c| c.owner_id == owner_id && c.id == customer_id)
            .ok_or(DomainError::NotFound)?;
        customer.password_hash = password_hash;
        Ok(())
    }

    async fn post_transaction(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
        amount: Amount,
        note: Option<String>,
    ) -> Result<LedgerEntry, StoreError> {
        let mut state = self.lock();

        let idx = state
            .customers
            .iter()
            .position(|c| c.owner_id == owner_id && &c.customer_code == code)
            .ok_or(DomainError::NotFound)?;

        // Append + increment under the same lock: the atomic unit.
        state.next_entry_id += 1;
        let entry = LedgerEntry {
            id: state.next_entry_id,
            owner_id,
            customer_id: state.customers[idx].id,
            amount,
            note,
            created_at: Utc::now(),
        };
        state.entries.push(entry.clone());
        state.customers[idx].balance += amount.units();

        Ok(entry)
    }

    async fn customer_statement(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
    ) -> Result<Statement, StoreError> {
        let state = self.lock();
        let customer = state
            .customers
            .iter()
            .find(|c| c.owner_id == owner_id && &c.customer_code == code)
            .ok_or(DomainError::NotFound)?;
        Ok(statement_for(&state, customer))
    }

    async fn customer_statement_by_id(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Statement, StoreError> {
        let state = self.lock();
        let customer = state
            .customers
            .iter()
            .find(|c| c.owner_id == owner_id && c.id == customer_id)
            .ok_or(DomainError::NotFound)?;
        Ok(statement_for(&state, customer))
    }

    async fn put_login_otp(&self, pending: PendingOtp) -> Result<(), StoreError> {
        self.lock().otps.insert(pending.email.clone(), pending);
        Ok(())
    }

    async fn get_login_otp(&self, email: &str) -> Result<Option<PendingOtp>, StoreError> {
        Ok(self.lock().otps.get(email).cloned())
    }

    async fn delete_login_otp(&self, email: &str) -> Result<(), StoreError> {
        self.lock().otps.remove(email);
        Ok(())
    }
}
