//! In-memory ledger store.
//!
//! Same semantics as the PostgreSQL store with a single mutex standing in
//! for row-level locking: every unit of work runs under the lock, so the
//! balance check and debit are atomic with respect to concurrent transfers.
//! Used by the test suite.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::models::{TransactionRecord, TransferStatus};
use super::LedgerStore;

#[derive(Default)]
struct State {
    next_account_id: i64,
    next_record_id: i64,
    balances: HashMap<i64, Decimal>,
    records: Vec<TransactionRecord>,
}

#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_record(state: &mut State, from: i64, to: i64, amount: Decimal, status: TransferStatus) {
        state.next_record_id += 1;
        state.records.push(TransactionRecord {
            id: state.next_record_id,
            from_id: from,
            to_id: to,
            amount,
            status,
            created_at: Utc::now(),
        });
    }

    /// Total number of records, across all accounts.
    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn create_account(&self, initial_balance: Decimal) -> Result<i64, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.next_account_id += 1;
        let id = state.next_account_id;
        state.balances.insert(id, initial_balance);
        Ok(id)
    }

    async fn account_exists(&self, id: i64) -> Result<bool, LedgerError> {
        Ok(self.state.lock().unwrap().balances.contains_key(&id))
    }

    async fn balance_of(&self, id: i64) -> Result<Decimal, LedgerError> {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&id)
            .copied()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn apply_transfer(
        &self,
        from: i64,
        to: i64,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();

        let sender = *state
            .balances
            .get(&from)
            .ok_or(LedgerError::AccountNotFound(from))?;
        if !state.balances.contains_key(&to) {
            return Err(LedgerError::AccountNotFound(to));
        }

        if sender - amount < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }

        *state.balances.get_mut(&from).unwrap() -= amount;
        *state.balances.get_mut(&to).unwrap() += amount;
        Self::insert_record(&mut state, from, to, amount, TransferStatus::Accepted);
        Ok(())
    }

    async fn record_rejected(
        &self,
        from: i64,
        to: i64,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();
        Self::insert_record(&mut state, from, to, amount, TransferStatus::Rejected);
        Ok(())
    }

    async fn transactions_for(&self, account: i64) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.from_id == account || r.to_id == account)
            .cloned()
            .collect())
    }

    async fn health(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_full_balance_transfer_accepted() {
        let ledger = MemoryLedger::new();
        let a = ledger.create_account(Decimal::from(1000)).await.unwrap();
        let b = ledger.create_account(Decimal::from(1000)).await.unwrap();

        // Amount equal to the entire balance is allowed: zero is a valid
        // resulting balance.
        ledger
            .apply_transfer(a, b, Decimal::from(1000))
            .await
            .unwrap();

        assert_eq!(ledger.balance_of(a).await.unwrap(), Decimal::ZERO);
        assert_eq!(ledger.balance_of(b).await.unwrap(), Decimal::from(2000));

        let records = ledger.transactions_for(a).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, TransferStatus::Accepted);
        assert_eq!(records[0].amount, Decimal::from(1000));
    }

    #[tokio::test]
    async fn test_overdraft_rejected_without_mutation() {
        let ledger = MemoryLedger::new();
        let a = ledger.create_account(Decimal::from(1000)).await.unwrap();
        let b = ledger.create_account(Decimal::from(1000)).await.unwrap();

        let err = ledger
            .apply_transfer(a, b, Decimal::from(1500))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds));

        assert_eq!(ledger.balance_of(a).await.unwrap(), Decimal::from(1000));
        assert_eq!(ledger.balance_of(b).await.unwrap(), Decimal::from(1000));
        assert_eq!(ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_sender_is_not_recorded() {
        let ledger = MemoryLedger::new();
        let b = ledger.create_account(Decimal::from(1000)).await.unwrap();

        let err = ledger
            .apply_transfer(-1, b, Decimal::from(1000))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(-1)));

        assert_eq!(ledger.balance_of(b).await.unwrap(), Decimal::from(1000));
        assert_eq!(ledger.record_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let ledger = Arc::new(MemoryLedger::new());
        let sender = ledger.create_account(Decimal::from(1000)).await.unwrap();
        let receiver = ledger.create_account(Decimal::ZERO).await.unwrap();

        // Two 600s against a balance of 1000: exactly one must win.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .apply_transfer(sender, receiver, Decimal::from(600))
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(ledger.balance_of(sender).await.unwrap(), Decimal::from(400));
        assert_eq!(
            ledger.balance_of(receiver).await.unwrap(),
            Decimal::from(600)
        );
    }

    #[tokio::test]
    async fn test_concurrent_debits_both_fit() {
        let ledger = Arc::new(MemoryLedger::new());
        let sender = ledger.create_account(Decimal::from(1000)).await.unwrap();
        let receiver = ledger.create_account(Decimal::ZERO).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .apply_transfer(sender, receiver, Decimal::from(500))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(ledger.balance_of(sender).await.unwrap(), Decimal::ZERO);
        assert_eq!(
            ledger.balance_of(receiver).await.unwrap(),
            Decimal::from(1000)
        );
    }
}
