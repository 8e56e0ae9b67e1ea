//! End-to-end pipeline tests: intake handler, in-memory broker, processor,
//! in-memory ledger. No external infrastructure required.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use rust_decimal::Decimal;

use ledgerflow::gateway::handlers::transfer::{SubmitTransferRequest, submit_transfer};
use ledgerflow::gateway::state::AppState;
use ledgerflow::ledger::{LedgerStore, MemoryLedger, TransferStatus};
use ledgerflow::metrics::Metrics;
use ledgerflow::processor::TransferProcessor;
use ledgerflow::queue::MemoryBroker;
use ledgerflow::user_auth::Claims;

const QUEUE: &str = "transactions";

struct Pipeline {
    state: Arc<AppState>,
    broker: MemoryBroker,
    ledger: Arc<MemoryLedger>,
    processor: TransferProcessor,
}

impl Pipeline {
    async fn new() -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        let broker = MemoryBroker::new();
        let metrics = Arc::new(Metrics::new());
        let state = Arc::new(AppState::new(
            ledger.clone(),
            Arc::new(broker.clone()),
            None,
            metrics.clone(),
            None,
            QUEUE.to_string(),
        ));
        let processor = TransferProcessor::new(ledger.clone(), metrics);
        Self {
            state,
            broker,
            ledger,
            processor,
        }
    }

    async fn account(&self, balance: i64) -> i64 {
        self.ledger
            .create_account(Decimal::from(balance))
            .await
            .unwrap()
    }

    async fn submit(&self, from: i64, to: i64, amount: Decimal) -> Result<(), ()> {
        let claims = Claims {
            sub: from.to_string(),
            exp: usize::MAX,
            iat: 0,
        };
        submit_transfer(
            State(self.state.clone()),
            Extension(claims),
            Json(SubmitTransferRequest { amount, to }),
        )
        .await
        .map(|_| ())
        .map_err(|_| ())
    }

    /// Run the processor over everything currently queued.
    async fn drain(&self) {
        let mut consumer = self.broker.consumer(QUEUE);
        while let Some(delivery) = consumer.try_next() {
            self.processor.process(delivery).await.unwrap();
        }
    }

    async fn balance(&self, id: i64) -> Decimal {
        self.ledger.balance_of(id).await.unwrap()
    }
}

#[tokio::test]
async fn test_happy_path_full_balance() {
    let p = Pipeline::new().await;
    let alice = p.account(1000).await;
    let bob = p.account(1000).await;

    // The whole balance may be sent; zero is a legal resulting balance.
    p.submit(alice, bob, Decimal::from(1000)).await.unwrap();
    p.drain().await;

    assert_eq!(p.balance(alice).await, Decimal::ZERO);
    assert_eq!(p.balance(bob).await, Decimal::from(2000));

    let records = p.ledger.transactions_for(alice).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TransferStatus::Accepted);
}

#[tokio::test]
async fn test_overdraft_rejected_and_recorded() {
    let p = Pipeline::new().await;
    let alice = p.account(1000).await;
    let bob = p.account(1000).await;

    p.submit(alice, bob, Decimal::from(1500)).await.unwrap();
    p.drain().await;

    assert_eq!(p.balance(alice).await, Decimal::from(1000));
    assert_eq!(p.balance(bob).await, Decimal::from(1000));

    let records = p.ledger.transactions_for(alice).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TransferStatus::Rejected);
    assert_eq!(records[0].amount, Decimal::from(1500));
}

#[tokio::test]
async fn test_garbage_payload_dropped_without_trace() {
    use ledgerflow::queue::QueuePublisher;

    let p = Pipeline::new().await;
    p.account(1000).await;

    p.broker
        .publish(QUEUE, b"{\"messageId\": 42, \"garbage\": true}")
        .await
        .unwrap();
    p.drain().await;

    // Not requeued, no ledger trace.
    assert_eq!(p.broker.depth(QUEUE), 0);
    assert_eq!(p.ledger.record_count(), 0);
}

#[tokio::test]
async fn test_unknown_recipient_in_flight_drops_silently() {
    use ledgerflow::message::TransferMessage;
    use ledgerflow::queue::QueuePublisher;

    let p = Pipeline::new().await;
    let alice = p.account(1000).await;

    // Bypass intake's existence check: the message is already in flight
    // when the consumer discovers the account is unknown.
    let msg = TransferMessage::new(alice, 9999, Decimal::from(10));
    p.broker.publish(QUEUE, &msg.encode().unwrap()).await.unwrap();
    p.drain().await;

    assert_eq!(p.balance(alice).await, Decimal::from(1000));
    assert_eq!(p.ledger.record_count(), 0);
}

#[tokio::test]
async fn test_concurrent_transfers_exactly_one_wins() {
    let p = Pipeline::new().await;
    let alice = p.account(1000).await;
    let bob = p.account(0).await;

    // Two 600s against 1000: one accepted, one rejected with a record.
    p.submit(alice, bob, Decimal::from(600)).await.unwrap();
    p.submit(alice, bob, Decimal::from(600)).await.unwrap();
    p.drain().await;

    assert_eq!(p.balance(alice).await, Decimal::from(400));
    assert_eq!(p.balance(bob).await, Decimal::from(600));

    let records = p.ledger.transactions_for(alice).await.unwrap();
    let accepted = records
        .iter()
        .filter(|r| r.status == TransferStatus::Accepted)
        .count();
    let rejected = records
        .iter()
        .filter(|r| r.status == TransferStatus::Rejected)
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(rejected, 1);
}

#[tokio::test]
async fn test_concurrent_transfers_both_fit() {
    let p = Pipeline::new().await;
    let alice = p.account(1000).await;
    let bob = p.account(0).await;

    p.submit(alice, bob, Decimal::from(500)).await.unwrap();
    p.submit(alice, bob, Decimal::from(500)).await.unwrap();
    p.drain().await;

    assert_eq!(p.balance(alice).await, Decimal::ZERO);
    assert_eq!(p.balance(bob).await, Decimal::from(1000));
}

#[tokio::test]
async fn test_counters_track_pipeline_flow() {
    let p = Pipeline::new().await;
    let alice = p.account(1000).await;
    let bob = p.account(0).await;

    p.submit(alice, bob, Decimal::from(100)).await.unwrap();
    p.submit(alice, bob, Decimal::from(100)).await.unwrap();
    p.drain().await;

    let metrics = &p.state.metrics;
    assert_eq!(metrics.transfers_submitted(), 2);
    assert_eq!(metrics.messages_sent(), 2);
    assert_eq!(metrics.messages_received(), 2);
    assert_eq!(metrics.transfers_orphaned(), 0);
}
