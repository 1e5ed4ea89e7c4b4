//! `khata-ledger` — transaction ledger domain types.
//!
//! The ledger is an append-only log of signed integer amounts per
//! `(owner, customer)`. A customer's balance is a denormalized running total
//! that must always equal the sum of that customer's entries; the store layer
//! maintains it atomically alongside each append, and `recompute_balance`
//! here is the oracle tests check it against.

pub mod amount;
pub mod entry;
pub mod statement;

pub use amount::Amount;
pub use entry::{recompute_balance, LedgerEntry};
pub use statement::{CustomerSummary, EntryView, Statement};
