//! Ledger data model: accounts and immutable transaction records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a processed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Debit, credit and record were committed atomically.
    Accepted,
    /// Insufficient funds; no balance was mutated.
    Rejected,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Accepted => "accepted",
            TransferStatus::Rejected => "rejected",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(TransferStatus::Accepted),
            "rejected" => Some(TransferStatus::Rejected),
            _ => None,
        }
    }
}

/// An account holding a balance. Balances are mutated exclusively by the
/// processor's unit of work; accounts are never deleted in normal operation.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub balance: Decimal,
}

/// Persisted outcome of a processed transfer. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    #[serde(rename = "fromId")]
    pub from_id: i64,
    #[serde(rename = "toId")]
    pub to_id: i64,
    pub amount: Decimal,
    pub status: TransferStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
