//! Ledger error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// The referenced account does not exist. Distinct from a rejection:
    /// no TransactionRecord is ever written for this case.
    #[error("account {0} not found")]
    AccountNotFound(i64),

    /// Business outcome, not a system error: the sender cannot cover the
    /// amount. The unit of work aborts with both balances untouched.
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
