//! In-process queue with broker ack/reject semantics.
//!
//! Backs the test suite and lets the intake and processor be exercised
//! end-to-end without a broker. A rejected-with-requeue message goes back to
//! the front of the queue, matching redelivery order of a single-consumer
//! AMQP channel.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{Acknowledger, Delivery, QueueConsumer, QueueError, QueuePublisher};

#[derive(Default)]
struct QueueState {
    messages: Mutex<VecDeque<Vec<u8>>>,
    notify: Notify,
}

impl QueueState {
    fn push_back(&self, payload: Vec<u8>) {
        self.messages.lock().unwrap().push_back(payload);
        self.notify.notify_one();
    }

    fn push_front(&self, payload: Vec<u8>) {
        self.messages.lock().unwrap().push_front(payload);
        self.notify.notify_one();
    }

    fn pop(&self) -> Option<Vec<u8>> {
        self.messages.lock().unwrap().pop_front()
    }

    fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

/// Shared in-memory broker. Cloning is cheap and refers to the same queues.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    queues: Arc<Mutex<HashMap<String, Arc<QueueState>>>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, name: &str) -> Arc<QueueState> {
        let mut queues = self.queues.lock().unwrap();
        queues.entry(name.to_string()).or_default().clone()
    }

    pub fn consumer(&self, queue: &str) -> MemoryConsumer {
        MemoryConsumer {
            queue: self.queue(queue),
        }
    }

    /// Number of messages currently waiting on `queue`.
    pub fn depth(&self, queue: &str) -> usize {
        self.queue(queue).len()
    }
}

#[async_trait]
impl QueuePublisher for MemoryBroker {
    async fn declare(&self, queue: &str) -> Result<(), QueueError> {
        self.queue(queue);
        Ok(())
    }

    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), QueueError> {
        self.queue(queue).push_back(payload.to_vec());
        Ok(())
    }
}

pub struct MemoryConsumer {
    queue: Arc<QueueState>,
}

impl MemoryConsumer {
    /// Non-blocking pull, for drain-style tests.
    pub fn try_next(&mut self) -> Option<Delivery> {
        self.queue.pop().map(|payload| {
            Delivery::new(
                payload.clone(),
                Box::new(MemoryAcker {
                    queue: self.queue.clone(),
                    payload,
                }),
            )
        })
    }
}

#[async_trait]
impl QueueConsumer for MemoryConsumer {
    async fn next(&mut self) -> Result<Option<Delivery>, QueueError> {
        loop {
            // Register interest before checking, so a publish between the
            // check and the await still wakes us.
            let queue = self.queue.clone();
            let notified = queue.notify.notified();
            if let Some(delivery) = self.try_next() {
                return Ok(Some(delivery));
            }
            notified.await;
        }
    }
}

struct MemoryAcker {
    queue: Arc<QueueState>,
    payload: Vec<u8>,
}

#[async_trait]
impl Acknowledger for MemoryAcker {
    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        Ok(())
    }

    async fn reject(self: Box<Self>, requeue: bool) -> Result<(), QueueError> {
        if requeue {
            self.queue.push_front(self.payload);
        }
        Ok(())
    }
}
