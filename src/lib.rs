//! LedgerFlow - asynchronous funds-transfer pipeline.
//!
//! An HTTP gateway accepts transfer submissions and publishes them to a
//! durable queue; a consumer pulls them off and settles each one as an
//! atomic unit of work against a PostgreSQL ledger.
//!
//! # Modules
//!
//! - [`message`] - Transfer wire schema shared by producer and consumer
//! - [`queue`] - Broker abstraction (AMQP in production, in-memory in tests)
//! - [`ledger`] - Atomic balance mutation and transaction records
//! - [`gateway`] - HTTP intake: auth, validation, publish
//! - [`processor`] - Queue consumer and settlement state machine
//! - [`user_auth`] - Registration, login, JWT middleware
//! - [`metrics`] - Pipeline counters
//! - [`config`] - YAML configuration per environment
//! - [`db`] - PostgreSQL connection pool
//! - [`logging`] - Tracing setup with file rotation

pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod message;
pub mod metrics;
pub mod processor;
pub mod queue;
pub mod user_auth;

// Convenient re-exports at crate root
pub use ledger::{LedgerError, LedgerStore, MemoryLedger, PgLedger, TransferStatus};
pub use message::{SchemaError, TransferMessage};
pub use metrics::Metrics;
pub use processor::TransferProcessor;
pub use queue::{Delivery, MemoryBroker, QueueConsumer, QueueError, QueuePublisher};
