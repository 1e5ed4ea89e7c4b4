//! Postgres-backed store implementation.
//!
//! ## Error mapping
//!
//! SQLx database errors map to [`StoreError`] as follows:
//!
//! | PostgreSQL code | meaning | mapped to |
//! |-----------------|---------|-----------|
//! | `23505` | unique violation | `DomainError::Conflict` |
//! | `23514` | check violation (`amount <> 0`) | `DomainError::InvalidInput` |
//! | other  | anything else | `StoreError::Backend` |
//!
//! ## Concurrency
//!
//! - `post_transaction` runs insert + `balance = balance + $n` in one
//!   transaction; the increment happens in SQL, so concurrent posts against
//!   the same customer serialize on the row and no update is lost.
//! - `create_customer` takes `SELECT ... FOR UPDATE` on the owner row before
//!   counting, which serializes code allocation per owner. The unique
//!   constraint on `(owner_id, customer_code)` is the backstop; a violation
//!   is retried a bounded number of times and then surfaced as `Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use khata_core::{CustomerCode, CustomerId, DomainError, OwnerId, ShopCode};
use khata_identity::{Customer, NewCustomer, NewOwner, Owner, PendingOtp};
use khata_ledger::{Amount, CustomerSummary, EntryView, LedgerEntry, Statement};

use crate::error::StoreError;
use crate::r#trait::Store;

/// Attempts before a code collision is surfaced to the caller.
const CODE_ALLOC_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema (idempotent `CREATE ... IF NOT EXISTS` statements).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self, new), fields(email = %new.email), err)]
    async fn create_owner(&self, new: NewOwner) -> Result<Owner, StoreError> {
        let id = OwnerId::new();
        sqlx::query("INSERT INTO owners (id, email, shop_code) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(&new.email)
            .bind(new.shop_code.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict("email or shop code already exists").into()
                } else {
                    map_sqlx_error("create_owner", e)
                }
            })?;

        Ok(Owner {
            id,
            email: new.email,
            shop_code: new.shop_code,
        })
    }

    async fn find_owner(&self, id: OwnerId) -> Result<Option<Owner>, StoreError> {
        let row = sqlx::query("SELECT id, email, shop_code FROM owners WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_owner", e))?;
        row.map(owner_from_row).transpose()
    }

    async fn find_owner_by_email(&self, email: &str) -> Result<Option<Owner>, StoreError> {
        let row = sqlx::query("SELECT id, email, shop_code FROM owners WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_owner_by_email", e))?;
        row.map(owner_from_row).transpose()
    }

    #[instrument(skip(self, new), fields(owner_id = %owner_id), err)]
    async fn create_customer(
        &self,
        owner_id: OwnerId,
        new: NewCustomer,
    ) -> Result<Customer, StoreError> {
        for _attempt in 0..CODE_ALLOC_ATTEMPTS {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("create_customer.begin", e))?;

            // Serialize allocation per owner: later creators for the same
            // owner block here until this transaction commits.
            let owner_row = sqlx::query("SELECT id FROM owners WHERE id = $1 FOR UPDATE")
                .bind(owner_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("create_customer.lock_owner", e))?;
            if owner_row.is_none() {
                return Err(DomainError::NotFound.into());
            }

            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE owner_id = $1")
                    .bind(owner_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("create_customer.count", e))?;

            let code = CustomerCode::from_sequence(count as u64 + 1);
            let id = CustomerId::new();

            let inserted = sqlx::query(
                r#"
                INSERT INTO customers (id, owner_id, customer_code, name, password_hash, balance)
                VALUES ($1, $2, $3, $4, $5, 0)
                "#,
            )
            .bind(id.as_uuid())
            .bind(owner_id.as_uuid())
            .bind(code.as_str())
            .bind(&new.name)
            .bind(&new.password_hash)
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => {
                    tx.commit()
                        .await
                        .map_err(|e| map_sqlx_error("create_customer.commit", e))?;
                    return Ok(Customer {
                        id,
                        owner_id,
                        customer_code: code,
                        name: new.name,
                        password_hash: new.password_hash,
                        balance: 0,
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    // Lost the allocation backstop; roll back and recount.
                    tracing::warn!(owner_id = %owner_id, code = %code, "customer code collision, retrying");
                    tx.rollback()
                        .await
                        .map_err(|e| map_sqlx_error("create_customer.rollback", e))?;
                    continue;
                }
                Err(e) => return Err(map_sqlx_error("create_customer.insert", e)),
            }
        }

        Err(DomainError::conflict("customer code allocation kept colliding").into())
    }

    async fn list_customers(&self, owner_id: OwnerId) -> Result<Vec<CustomerSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT customer_code, name, balance
            FROM customers
            WHERE owner_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(CustomerSummary {
                    customer_code: code_from_row(&row, "customer_code")?,
                    name: try_get(&row, "list_customers", "name")?,
                    balance: try_get(&row, "list_customers", "balance")?,
                })
            })
            .collect()
    }

    async fn find_customer_by_owner_and_code(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
    ) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, customer_code, name, password_hash, balance
            FROM customers
            WHERE owner_id = $1 AND customer_code = $2
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_customer_by_owner_and_code", e))?;
        row.map(customer_from_row).transpose()
    }

    async fn find_customer_by_shop_and_code(
        &self,
        shop_code: &ShopCode,
        code: &CustomerCode,
    ) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.owner_id, c.customer_code, c.name, c.password_hash, c.balance
            FROM customers c
            JOIN owners o ON o.id = c.owner_id
            WHERE o.shop_code = $1 AND c.customer_code = $2
            "#,
        )
        .bind(shop_code.as_str())
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_customer_by_shop_and_code", e))?;
        row.map(customer_from_row).transpose()
    }

    async fn find_customer(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, customer_code, name, password_hash, balance
            FROM customers
            WHERE owner_id = $1 AND id = $2
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(customer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_customer", e))?;
        row.map(customer_from_row).transpose()
    }

    async fn update_customer_password(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
        password_hash: String,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE customers SET password_hash = $1 WHERE owner_id = $2 AND id = $3",
        )
        .bind(&password_hash)
        .bind(owner_id.as_uuid())
        .bind(customer_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_customer_password", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound.into());
        }
        Ok(())
    }

    #[instrument(skip(self, note), fields(owner_id = %owner_id, code = %code, amount = amount.units()), err)]
    async fn post_transaction(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
        amount: Amount,
        note: Option<String>,
    ) -> Result<LedgerEntry, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("post_transaction.begin", e))?;

        let customer_row = sqlx::query(
            "SELECT id FROM customers WHERE owner_id = $1 AND customer_code = $2",
        )
        .bind(owner_id.as_uuid())
        .bind(code.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("post_transaction.find_customer", e))?;

        let Some(customer_row) = customer_row else {
            return Err(DomainError::NotFound.into());
        };
        let customer_uuid: Uuid = try_get(&customer_row, "post_transaction", "id")?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO transactions (owner_id, customer_id, amount, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(customer_uuid)
        .bind(amount.units())
        .bind(&note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("post_transaction.insert", e))?;

        // In-place increment: never a read-modify-write from a stale snapshot.
        sqlx::query("UPDATE customers SET balance = balance + $1 WHERE id = $2")
            .bind(amount.units())
            .bind(customer_uuid)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("post_transaction.increment", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("post_transaction.commit", e))?;

        Ok(LedgerEntry {
            id: try_get(&inserted, "post_transaction", "id")?,
            owner_id,
            customer_id: CustomerId::from_uuid(customer_uuid),
            amount,
            note,
            created_at: try_get(&inserted, "post_transaction", "created_at")?,
        })
    }

    async fn customer_statement(
        &self,
        owner_id: OwnerId,
        code: &CustomerCode,
    ) -> Result<Statement, StoreError> {
        let customer = self
            .find_customer_by_owner_and_code(owner_id, code)
            .await?
            .ok_or(DomainError::NotFound)?;
        self.statement_entries(customer).await
    }

    async fn customer_statement_by_id(
        &self,
        owner_id: OwnerId,
        customer_id: CustomerId,
    ) -> Result<Statement, StoreError> {
        let customer = self
            .find_customer(owner_id, customer_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        self.statement_entries(customer).await
    }

    async fn put_login_otp(&self, pending: PendingOtp) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO login_otps (email, otp_hash, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email)
            DO UPDATE SET otp_hash = EXCLUDED.otp_hash, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&pending.email)
        .bind(&pending.otp_hash)
        .bind(pending.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("put_login_otp", e))?;
        Ok(())
    }

    async fn get_login_otp(&self, email: &str) -> Result<Option<PendingOtp>, StoreError> {
        let row = sqlx::query(
            "SELECT email, otp_hash, expires_at FROM login_otps WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_login_otp", e))?;

        row.map(|row| {
            Ok(PendingOtp {
                email: try_get(&row, "get_login_otp", "email")?,
                otp_hash: try_get(&row, "get_login_otp", "otp_hash")?,
                expires_at: try_get(&row, "get_login_otp", "expires_at")?,
            })
        })
        .transpose()
    }

    async fn delete_login_otp(&self, email: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM login_otps WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_login_otp", e))?;
        Ok(())
    }
}

impl PostgresStore {
    async fn statement_entries(&self, customer: Customer) -> Result<Statement, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT amount, note, created_at
            FROM transactions
            WHERE owner_id = $1 AND customer_id = $2
            ORDER BY id DESC
            "#,
        )
        .bind(customer.owner_id.as_uuid())
        .bind(customer.id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("statement_entries", e))?;

        let entries = rows
            .into_iter()
            .map(|row| {
                Ok(EntryView {
                    amount: try_get(&row, "statement_entries", "amount")?,
                    note: try_get(&row, "statement_entries", "note")?,
                    created_at: try_get(&row, "statement_entries", "created_at")?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Statement {
            customer_name: customer.name,
            customer_code: customer.customer_code,
            balance: customer.balance,
            entries,
        })
    }
}

// Row mapping helpers

fn try_get<'r, T>(row: &'r PgRow, operation: &str, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::backend(operation, format!("column {column}: {e}")))
}

fn code_from_row(row: &PgRow, column: &str) -> Result<CustomerCode, StoreError> {
    let raw: String = try_get(row, "code_from_row", column)?;
    CustomerCode::parse(&raw).map_err(StoreError::from)
}

fn owner_from_row(row: PgRow) -> Result<Owner, StoreError> {
    let id: Uuid = try_get(&row, "owner_from_row", "id")?;
    let shop_code: String = try_get(&row, "owner_from_row", "shop_code")?;
    Ok(Owner {
        id: OwnerId::from_uuid(id),
        email: try_get(&row, "owner_from_row", "email")?,
        shop_code: ShopCode::parse(&shop_code)?,
    })
}

fn customer_from_row(row: PgRow) -> Result<Customer, StoreError> {
    let id: Uuid = try_get(&row, "customer_from_row", "id")?;
    let owner_id: Uuid = try_get(&row, "customer_from_row", "owner_id")?;
    Ok(Customer {
        id: CustomerId::from_uuid(id),
        owner_id: OwnerId::from_uuid(owner_id),
        customer_code: code_from_row(&row, "customer_code")?,
        name: try_get(&row, "customer_from_row", "name")?,
        password_hash: try_get(&row, "customer_from_row", "password_hash")?,
        balance: try_get(&row, "customer_from_row", "balance")?,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation
                Some("23505") => DomainError::conflict(msg).into(),
                // Check constraint violation (amount <> 0)
                Some("23514") => DomainError::invalid_input(msg).into(),
                _ => StoreError::backend(operation, msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
