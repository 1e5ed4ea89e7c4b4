//! `khata-store` — the persistent store behind the ledger core.
//!
//! The store is the sole shared mutable resource in the system: identity
//! rows, the append-only transaction log, the denormalized balances, and the
//! pending login codes all live behind the [`Store`] trait. Two
//! implementations:
//!
//! - [`InMemoryStore`]: tests and local development; a single mutex gives the
//!   same all-or-nothing semantics the SQL transactions give in production.
//! - [`PostgresStore`]: sqlx/Postgres; the append+increment unit runs in one
//!   transaction, and customer creation serializes per owner via a row lock.

pub mod error;
pub mod in_memory;
pub mod postgres;
mod r#trait;


pub use error::StoreError;
pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::Store;
