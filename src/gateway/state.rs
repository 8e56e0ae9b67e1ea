use std::sync::Arc;

use crate::gateway::rate_limit::RateLimiter;
use crate::ledger::LedgerStore;
use crate::metrics::Metrics;
use crate::queue::QueuePublisher;
use crate::user_auth::UserAuthService;

/// Shared gateway state. Connections are explicit objects created at
/// startup and injected here; nothing reaches for a global client.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerStore>,
    pub queue: Arc<dyn QueuePublisher>,
    /// None only in tests that bypass authentication.
    pub user_auth: Option<Arc<UserAuthService>>,
    pub metrics: Arc<Metrics>,
    /// None when rate limiting is disabled (e.g. test config).
    pub limiter: Option<Arc<RateLimiter>>,
    /// Name of the transfer queue shared with the consumer.
    pub queue_name: String,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        queue: Arc<dyn QueuePublisher>,
        user_auth: Option<Arc<UserAuthService>>,
        metrics: Arc<Metrics>,
        limiter: Option<Arc<RateLimiter>>,
        queue_name: String,
    ) -> Self {
        Self {
            ledger,
            queue,
            user_auth,
            metrics,
            limiter,
            queue_name,
        }
    }
}
