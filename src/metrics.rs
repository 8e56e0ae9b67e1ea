//! Pipeline counters.
//!
//! Fire-and-forget: incrementing never fails and never blocks core logic.
//! There is no exporter surface; snapshots show up in shutdown logs and are
//! asserted on in tests.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    /// Transfer submissions that reached the intake handler.
    transfers_submitted: AtomicU64,
    /// Messages successfully published to the queue.
    messages_sent: AtomicU64,
    /// Messages pulled by the processor, regardless of outcome.
    messages_received: AtomicU64,
    /// Acked messages whose apply step failed after the ack (orphaned
    /// intents, reconciliation input).
    transfers_orphaned: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_transfers_submitted(&self) {
        self.transfers_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_messages_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_messages_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_transfers_orphaned(&self) {
        self.transfers_orphaned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transfers_submitted(&self) -> u64 {
        self.transfers_submitted.load(Ordering::Relaxed)
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn transfers_orphaned(&self) -> u64 {
        self.transfers_orphaned.load(Ordering::Relaxed)
    }

    pub fn log_snapshot(&self) {
        tracing::info!(
            transfers_submitted = self.transfers_submitted(),
            messages_sent = self.messages_sent(),
            messages_received = self.messages_received(),
            transfers_orphaned = self.transfers_orphaned(),
            "Pipeline counters"
        );
    }
}
