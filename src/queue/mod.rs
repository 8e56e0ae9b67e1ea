//! Queue client abstraction.
//!
//! Publish/consume primitives over a durable broker with explicit
//! acknowledge/reject semantics. Delivery is at-least-once: a message may be
//! redelivered after a crash that happens before acknowledgment, and
//! consumers must tolerate that.
//!
//! Production uses the AMQP implementation in [`amqp`]; tests run against
//! the in-process broker in [`memory`], which honors the same contract.

pub mod amqp;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use amqp::{AmqpConsumer, AmqpQueue};
pub use memory::{MemoryBroker, MemoryConsumer};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("broker did not confirm publish")]
    PublishNotConfirmed,

    #[error("consumer channel closed")]
    Closed,
}

/// Producer side of the queue.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Assert the durable queue. Safe to call repeatedly; both producer and
    /// consumer assert before first use.
    async fn declare(&self, queue: &str) -> Result<(), QueueError>;

    /// Durable enqueue, fire-and-confirm. Failure surfaces to the caller;
    /// there is no local retry.
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), QueueError>;
}

/// Consumer side of the queue: pull the next delivery.
#[async_trait]
pub trait QueueConsumer: Send {
    /// Wait for the next delivery. `Ok(None)` means the broker cancelled
    /// the consumer and the loop should exit.
    async fn next(&mut self) -> Result<Option<Delivery>, QueueError>;
}

/// Terminal disposition of a delivery. Consuming `self` makes double-ack a
/// compile error.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    /// Permanently remove the message from the queue.
    async fn ack(self: Box<Self>) -> Result<(), QueueError>;

    /// Drop the message, or put it back for redelivery when `requeue`.
    async fn reject(self: Box<Self>, requeue: bool) -> Result<(), QueueError>;
}

/// One delivered message plus its disposition handle.
pub struct Delivery {
    pub payload: Vec<u8>,
    acker: Box<dyn Acknowledger>,
}

impl Delivery {
    pub fn new(payload: Vec<u8>, acker: Box<dyn Acknowledger>) -> Self {
        Self { payload, acker }
    }

    pub async fn ack(self) -> Result<(), QueueError> {
        self.acker.ack().await
    }

    pub async fn reject(self, requeue: bool) -> Result<(), QueueError> {
        self.acker.reject(requeue).await
    }
}
