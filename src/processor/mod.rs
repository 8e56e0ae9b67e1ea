//! Queue consumer: the settlement side of the pipeline.
//!
//! One message is one unit of work. The processor validates the payload
//! against the wire schema, acknowledges the delivery, then applies the
//! transfer through the ledger store. The ack comes before the apply, so a
//! message is never redelivered once its schema has been asserted; the
//! trade-off is that an infrastructure failure after the ack loses the
//! transfer, which is why such failures are logged as orphaned intents and
//! counted separately.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::AppConfig;
use crate::db::Database;
use crate::ledger::{self, LedgerError, LedgerStore, PgLedger};
use crate::message::TransferMessage;
use crate::metrics::Metrics;
use crate::queue::{AmqpQueue, Delivery, QueueConsumer, QueueError};

pub struct TransferProcessor {
    ledger: Arc<dyn LedgerStore>,
    metrics: Arc<Metrics>,
}

impl TransferProcessor {
    pub fn new(ledger: Arc<dyn LedgerStore>, metrics: Arc<Metrics>) -> Self {
        Self { ledger, metrics }
    }

    /// Handle one delivery to its terminal disposition.
    pub async fn process(&self, delivery: Delivery) -> Result<(), QueueError> {
        self.metrics.incr_messages_received();

        // Schema assertion. A payload that fails it is not a transfer at
        // all: drop it without requeue and write nothing to the ledger.
        let msg = match TransferMessage::decode(&delivery.payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping message that failed schema check");
                return delivery.reject(false).await;
            }
        };

        tracing::info!(
            message_id = %msg.message_id,
            from = msg.from,
            to = msg.to,
            amount = %msg.amount,
            "Received transfer message"
        );

        // Ack before apply. From here on the message cannot be redelivered.
        delivery.ack().await?;

        match self.ledger.apply_transfer(msg.from, msg.to, msg.amount).await {
            Ok(()) => {
                tracing::info!(message_id = %msg.message_id, "Transfer accepted");
            }
            Err(LedgerError::InsufficientFunds) => {
                tracing::info!(
                    message_id = %msg.message_id,
                    from = msg.from,
                    "Transfer rejected, insufficient funds"
                );
                if let Err(e) = self
                    .ledger
                    .record_rejected(msg.from, msg.to, msg.amount)
                    .await
                {
                    self.metrics.incr_transfers_orphaned();
                    tracing::error!(
                        message_id = %msg.message_id,
                        error = %e,
                        "Orphaned transfer intent: rejected record could not be written"
                    );
                }
            }
            Err(LedgerError::AccountNotFound(id)) => {
                // Unknown account: the message vanishes without a record.
                tracing::warn!(
                    message_id = %msg.message_id,
                    account = id,
                    "Dropping transfer for unknown account"
                );
            }
            Err(e) => {
                self.metrics.incr_transfers_orphaned();
                tracing::error!(
                    message_id = %msg.message_id,
                    error = %e,
                    "Orphaned transfer intent: apply failed after acknowledgment"
                );
            }
        }

        Ok(())
    }

    /// Consume until the shutdown signal flips or the broker cancels the
    /// consumer. A unit of work in flight always runs to completion.
    pub async fn run<C: QueueConsumer>(
        &self,
        mut consumer: C,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), QueueError> {
        loop {
            tokio::select! {
                delivery = consumer.next() => {
                    match delivery? {
                        Some(delivery) => self.process(delivery).await?,
                        None => {
                            tracing::warn!("Broker cancelled the consumer");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Consumer shutting down");
                        break;
                    }
                }
            }
        }
        self.metrics.log_snapshot();
        Ok(())
    }
}

pub async fn run_consumer(config: &AppConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.postgres_url).await?;
    ledger::pg::init_schema(db.pool()).await?;
    let ledger: Arc<dyn LedgerStore> = Arc::new(PgLedger::new(db.pool().clone()));

    let queue = AmqpQueue::connect(&config.amqp.url).await?;
    let consumer = queue.consumer(&config.amqp.queue, "transfer-processor").await?;
    tracing::info!(queue = %config.amqp.queue, "Consumer waiting for messages");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let processor = TransferProcessor::new(ledger, Arc::new(Metrics::new()));
    processor.run(consumer, shutdown_rx).await?;

    queue.close().await?;
    Ok(())
}
