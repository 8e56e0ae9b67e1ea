//! Ledger store: atomic balance mutation and transaction-record persistence.
//!
//! All balance movement in the system goes through [`LedgerStore::apply_transfer`];
//! nothing else reads-then-writes a balance. The store must guarantee that
//! concurrent transfers touching the same account serialize, so the balance
//! check and the debit are never subject to a lost-update race.

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;

use async_trait::async_trait;
use rust_decimal::Decimal;

pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use models::{Account, TransactionRecord, TransferStatus};
pub use pg::PgLedger;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Provision an account with an opening balance; returns its id.
    async fn create_account(&self, initial_balance: Decimal) -> Result<i64, LedgerError>;

    async fn account_exists(&self, id: i64) -> Result<bool, LedgerError>;

    /// Current balance, or `AccountNotFound`.
    async fn balance_of(&self, id: i64) -> Result<Decimal, LedgerError>;

    /// The atomic unit of work: debit `from`, credit `to`, insert an
    /// `accepted` record. All three happen or none do.
    ///
    /// Fails with `InsufficientFunds` if the debit would take the sender
    /// below zero (exactly zero is allowed), leaving both balances
    /// untouched, and with `AccountNotFound` if either side is missing,
    /// in which case no record is written either.
    async fn apply_transfer(&self, from: i64, to: i64, amount: Decimal)
    -> Result<(), LedgerError>;

    /// Standalone insert of a `rejected` record, used when the unit of work
    /// aborts on insufficient funds. Never called for unknown accounts.
    async fn record_rejected(&self, from: i64, to: i64, amount: Decimal)
    -> Result<(), LedgerError>;

    /// Every record where `account` is sender or receiver, oldest first.
    async fn transactions_for(&self, account: i64) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Cheap store reachability probe for liveness checks.
    async fn health(&self) -> Result<(), LedgerError>;
}
