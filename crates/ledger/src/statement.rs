//! Read models served to owners and customers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use khata_core::CustomerCode;

/// One row of a statement as shown to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub amount: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer's statement: identity, current balance, and entries
/// **newest first**.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub customer_name: String,
    pub customer_code: CustomerCode,
    pub balance: i64,
    pub entries: Vec<EntryView>,
}

/// One line of an owner's customer listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_code: CustomerCode,
    pub name: String,
    pub balance: i64,
}
