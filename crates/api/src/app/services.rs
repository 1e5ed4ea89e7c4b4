//! Service wiring and application flows.
//!
//! `AppServices` owns the store, the code notifier, and the token signer;
//! every handler goes through a flow method here. Flows return
//! [`StoreError`] so handlers map outcomes to HTTP in exactly one place
//! (`errors.rs`).

use std::sync::Arc;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use khata_auth::{Hs256SessionSigner, Principal};
use khata_core::{CustomerCode, DomainError, OwnerId, ShopCode};
use khata_identity::{
    customer::validate_password, hash_password, verify_password, Customer, NewCustomer, NewOwner,
    OtpCode, Owner, PendingOtp,
};
use khata_ledger::{Amount, CustomerSummary, LedgerEntry, Statement};
use khata_notify::Notifier;
use khata_store::{InMemoryStore, PostgresStore, Store, StoreError};

use crate::config::Config;
use crate::context::CustomerContext;

pub struct AppServices {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    signer: Arc<Hs256SessionSigner>,
    admin_password: String,
}

/// Wire services from config: Postgres when `DATABASE_URL` is set, the
/// in-memory store otherwise (dev only).
pub async fn build_services(config: &Config) -> anyhow::Result<Arc<AppServices>> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().connect(url).await?;
            let store = PostgresStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is not persisted)");
            Arc::new(InMemoryStore::new())
        }
    };

    Ok(Arc::new(AppServices::new(
        store,
        Arc::new(khata_notify::TracingNotifier),
        Arc::new(Hs256SessionSigner::new(config.token_secret.as_bytes())),
        config.admin_password.clone(),
    )))
}

impl AppServices {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        signer: Arc<Hs256SessionSigner>,
        admin_password: String,
    ) -> Self {
        Self {
            store,
            notifier,
            signer,
            admin_password,
        }
    }

    pub fn signer(&self) -> Arc<Hs256SessionSigner> {
        Arc::clone(&self.signer)
    }

    fn issue_token(&self, principal: Principal) -> Result<String, StoreError> {
        self.signer
            .issue(principal, Utc::now())
            .map_err(|e| StoreError::backend("issue_token", e.to_string()))
    }

    // ---- admin ----

    /// Bootstrap a new owner. A wrong admin password reports `NotFound`, so
    /// the endpoint is indistinguishable from an absent one.
    pub async fn create_owner(
        &self,
        admin_password: &str,
        email: &str,
        shop_code: &str,
    ) -> Result<Owner, StoreError> {
        if admin_password != self.admin_password {
            return Err(DomainError::NotFound.into());
        }
        let new = NewOwner::new(email, shop_code)?;
        self.store.create_owner(new).await
    }

    // ---- owner login ----

    /// Issue a one-time login code for a known owner email.
    ///
    /// The code is hashed before it is stored; a re-request replaces any
    /// previous pending code. Delivery failure is logged, never surfaced.
    pub async fn request_owner_login(&self, email: &str) -> Result<(), StoreError> {
        let email = email.trim().to_lowercase();
        let owner = self
            .store
            .find_owner_by_email(&email)
            .await?
            .ok_or(DomainError::NotFound)?;

        let code = OtpCode::generate();
        let pending = PendingOtp::issue(&owner.email, &code, Utc::now())?;
        self.store.put_login_otp(pending).await?;

        if let Err(e) = self.notifier.send_code(&owner.email, code.as_str()).await {
            tracing::warn!(email = %owner.email, error = %e, "login code delivery failed");
        }
        Ok(())
    }

    /// Exchange a pending code for a session token. The code is single-use:
    /// it is deleted on success. Missing, expired, and mismatched codes are
    /// all `Unauthorized`.
    pub async fn verify_owner_login(&self, email: &str, otp: &str) -> Result<String, StoreError> {
        let email = email.trim().to_lowercase();
        let owner = self
            .store
            .find_owner_by_email(&email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let pending = self
            .store
            .get_login_otp(&owner.email)
            .await?
            .ok_or(DomainError::Unauthorized)?;
        pending.verify(otp, Utc::now())?;

        self.store.delete_login_otp(&owner.email).await?;
        self.issue_token(Principal::Owner { owner_id: owner.id })
    }

    // ---- owner surface ----

    pub async fn owner_info(&self, owner_id: OwnerId) -> Result<Owner, StoreError> {
        self.store
            .find_owner(owner_id)
            .await?
            .ok_or_else(|| DomainError::NotFound.into())
    }

    pub async fn list_customers(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<CustomerSummary>, StoreError> {
        self.store.list_customers(owner_id).await
    }

    pub async fn create_customer(
        &self,
        owner_id: OwnerId,
        name: &str,
        password: &str,
    ) -> Result<Customer, StoreError> {
        let new = NewCustomer::new(name, password)?;
        self.store.create_customer(owner_id, new).await
    }

    pub async fn post_transaction(
        &self,
        owner_id: OwnerId,
        customer_code: &str,
        amount: i64,
        note: Option<String>,
    ) -> Result<LedgerEntry, StoreError> {
        let code = CustomerCode::parse(customer_code)?;
        let amount = Amount::new(amount)?;
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.store
            .post_transaction(owner_id, &code, amount, note)
            .await
    }

    pub async fn owner_statement(
        &self,
        owner_id: OwnerId,
        customer_code: &str,
    ) -> Result<Statement, StoreError> {
        let code = CustomerCode::parse(customer_code)?;
        self.store.customer_statement(owner_id, &code).await
    }

    // ---- customer surface ----

    /// Customer password login, addressed by `(shop_code, customer_code)`.
    ///
    /// Every failure is `Unauthorized` — unknown shop, unknown code, bad
    /// password, even a malformed code — so the response never confirms
    /// which part was wrong.
    pub async fn customer_login(
        &self,
        shop_code: &str,
        customer_code: &str,
        password: &str,
    ) -> Result<String, StoreError> {
        let (shop, code) = match (ShopCode::parse(shop_code), CustomerCode::parse(customer_code)) {
            (Ok(s), Ok(c)) => (s, c),
            _ => return Err(DomainError::Unauthorized.into()),
        };

        let customer = self
            .store
            .find_customer_by_shop_and_code(&shop, &code)
            .await?
            .ok_or(DomainError::Unauthorized)?;
        verify_password(password, &customer.password_hash)?;

        self.issue_token(Principal::Customer {
            customer_id: customer.id,
            owner_id: customer.owner_id,
        })
    }

    /// Everything the customer view shows: shop code, identity, balance,
    /// and the statement newest first.
    pub async fn customer_data(
        &self,
        ctx: CustomerContext,
    ) -> Result<(ShopCode, Statement), StoreError> {
        let owner = self
            .store
            .find_owner(ctx.owner_id())
            .await?
            .ok_or(DomainError::NotFound)?;
        let statement = self
            .store
            .customer_statement_by_id(ctx.owner_id(), ctx.customer_id())
            .await?;
        Ok((owner.shop_code, statement))
    }

    /// Change the customer's password after proving the current one.
    pub async fn change_password(
        &self,
        ctx: CustomerContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        let customer = self
            .store
            .find_customer(ctx.owner_id(), ctx.customer_id())
            .await?
            .ok_or(DomainError::NotFound)?;
        verify_password(current_password, &customer.password_hash)?;

        validate_password(new_password)?;
        let hash = hash_password(new_password)?;
        self.store
            .update_customer_password(ctx.owner_id(), ctx.customer_id(), hash)
            .await
    }
}
