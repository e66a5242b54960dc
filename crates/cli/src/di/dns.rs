use ferrous_flatten_application::ports::{DnsHandler, FlattenEventSink};
use ferrous_flatten_application::use_cases::{CnameFlatteningHandler, ForwardHandler};
use ferrous_flatten_domain::Config;
use ferrous_flatten_infrastructure::dns::{
    FlattenEventEmitter, FlattenMetrics, ForwarderPool, HealthProbe,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct FlattenServices {
    pub handler: Arc<dyn DnsHandler>,
    pub flattening_pool: Arc<ForwarderPool>,
    pub pipeline_pool: Arc<ForwarderPool>,
    pub metrics: FlattenMetrics,
    background: Vec<JoinHandle<()>>,
}

impl FlattenServices {
    pub fn new(config: &Config, shutdown: &CancellationToken) -> anyhow::Result<Self> {
        info!("Initializing flattening services");

        let (events, metrics) = Self::setup_event_metrics();

        let flattening_pool = Arc::new(ForwarderPool::from_flattening_config(&config.flattening)?);
        let pipeline_pool = Arc::new(ForwarderPool::with_targets(
            "pipeline",
            config.pipeline.targets()?,
        ));
        flattening_pool.on_startup();
        pipeline_pool.on_startup();

        let background = Self::start_health_probes(
            config,
            &[Arc::clone(&flattening_pool), Arc::clone(&pipeline_pool)],
            shutdown,
        );

        let next: Arc<dyn DnsHandler> = Arc::new(
            ForwardHandler::new(pipeline_pool.clone()).with_event_sink(Arc::clone(&events)),
        );
        let handler: Arc<dyn DnsHandler> = Arc::new(
            CnameFlatteningHandler::new(flattening_pool.clone(), config.flattening.max_depth)
                .with_next(next)
                .with_event_sink(events),
        );

        info!(
            handler = handler.name(),
            max_depth = config.flattening.max_depth,
            "Flattening services initialized"
        );

        Ok(Self {
            handler,
            flattening_pool,
            pipeline_pool,
            metrics,
            background,
        })
    }

    fn setup_event_metrics() -> (Arc<dyn FlattenEventSink>, FlattenMetrics) {
        let (emitter, event_rx) = FlattenEventEmitter::new_enabled();
        let metrics = FlattenMetrics::new();
        metrics.spawn_collector(event_rx);
        (Arc::new(emitter), metrics)
    }

    fn start_health_probes(
        config: &Config,
        pools: &[Arc<ForwarderPool>],
        shutdown: &CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        if !config.health_check.enabled {
            info!("Health probing disabled");
            return Vec::new();
        }

        let interval = Duration::from_secs(config.health_check.interval);
        pools
            .iter()
            .map(|pool| HealthProbe::new(Arc::clone(pool), interval).spawn(shutdown.child_token()))
            .collect()
    }

    /// Wait for background tasks (the shutdown token must already be
    /// cancelled) and log the flattening counters.
    pub async fn shutdown(self) {
        for handle in self.background {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }

        info!(
            flattened = self.metrics.flattened(),
            passthrough = self.metrics.passthrough(),
            fallbacks = self.metrics.fallbacks(),
            upstream_failures = self.metrics.upstream_failures(),
            average_hops = self.metrics.average_hops(),
            flagged_flattening_targets = self.flattening_pool.flagged_targets().len(),
            flagged_pipeline_targets = self.pipeline_pool.flagged_targets().len(),
            "Flattening summary"
        );
        for (server, failures) in self.metrics.failures_by_server() {
            info!(server = %server, failures, "Upstream failures");
        }
    }
}
