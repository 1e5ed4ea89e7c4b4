use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use khata_core::{CustomerId, OwnerId};

use crate::amount::Amount;

/// One immutable ledger row.
///
/// `id` comes from the store's serial sequence; entries for a customer are
/// totally ordered by `created_at` with `id` as the tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub owner_id: OwnerId,
    pub customer_id: CustomerId,
    pub amount: Amount,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sum a customer's entries from scratch.
///
/// This is the invariant oracle: the denormalized balance the store maintains
/// must always equal this fold. Widened to i128 so the fold itself cannot
/// overflow before comparison.
pub fn recompute_balance<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> i128 {
    entries
        .into_iter()
        .map(|e| e.amount.units() as i128)
        .sum()
}
