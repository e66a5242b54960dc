use super::ForwarderPool;
use ferrous_flatten_application::ports::UpstreamForwarder;
use ferrous_flatten_application::services::build_query;
use ferrous_flatten_domain::{DnsQuery, RecordType};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodically re-probes flagged targets with a root `NS` query so a
/// recovered upstream returns to rotation before its flag expires.
pub struct HealthProbe {
    pool: Arc<ForwarderPool>,
    interval: Duration,
}

impl HealthProbe {
    pub fn new(pool: Arc<ForwarderPool>, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// Start probing; cancelling `shutdown` stops the task.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    async fn run(self, shutdown: CancellationToken) {
        info!(
            pool = self.pool.name(),
            interval_seconds = self.interval.as_secs(),
            "Health probe running"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(pool = self.pool.name(), "Health probe stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.probe_flagged().await;
                }
            }
        }
    }

    /// Probe every flagged target once. Returns how many answered.
    pub async fn probe_flagged(&self) -> usize {
        let flagged = self.pool.flagged_targets();
        if flagged.is_empty() {
            return 0;
        }

        let probe = match build_query(&DnsQuery::new(".", RecordType::NS)) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to build health probe");
                return 0;
            }
        };

        let mut recovered = 0;
        for index in flagged {
            match self.pool.query_target(index, &probe).await {
                Ok(_) => {
                    info!(pool = self.pool.name(), index, "Upstream recovered");
                    recovered += 1;
                }
                Err(e) => {
                    debug!(pool = self.pool.name(), index, error = %e, "Upstream still failing");
                }
            }
        }
        recovered
    }
}
