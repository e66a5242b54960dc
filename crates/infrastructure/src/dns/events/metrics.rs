use dashmap::DashMap;
use ferrous_flatten_application::ports::FlattenEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
pub struct FlattenMetrics {
    flattened: Arc<AtomicU64>,

    passthrough: Arc<AtomicU64>,

    fallbacks: Arc<AtomicU64>,

    upstream_failures: Arc<AtomicU64>,

    /// Sum of hop counts over flattened answers.
    total_hops: Arc<AtomicU64>,

    failures_by_server: Arc<DashMap<String, u64>>,
}

impl FlattenMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, event: &FlattenEvent) {
        match event {
            FlattenEvent::Flattened { hops, .. } => {
                self.flattened.fetch_add(1, Ordering::Relaxed);
                self.total_hops.fetch_add(*hops as u64, Ordering::Relaxed);
            }
            FlattenEvent::Passthrough { .. } => {
                self.passthrough.fetch_add(1, Ordering::Relaxed);
            }
            FlattenEvent::Fallback { .. } => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
            }
            FlattenEvent::UpstreamFailure { server, .. } => {
                self.upstream_failures.fetch_add(1, Ordering::Relaxed);
                self.failures_by_server
                    .entry(server.clone())
                    .and_modify(|c| *c += 1)
                    .or_insert(1);
            }
        }
    }

    /// Drain `rx` into these counters until every sender is dropped.
    pub fn spawn_collector(&self, mut rx: mpsc::UnboundedReceiver<FlattenEvent>) -> JoinHandle<()> {
        let metrics = self.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                metrics.track(&event);
            }
        })
    }

    pub fn flattened(&self) -> u64 {
        self.flattened.load(Ordering::Relaxed)
    }

    pub fn passthrough(&self) -> u64 {
        self.passthrough.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn upstream_failures(&self) -> u64 {
        self.upstream_failures.load(Ordering::Relaxed)
    }

    pub fn average_hops(&self) -> f64 {
        let flattened = self.flattened();
        if flattened == 0 {
            return 0.0;
        }
        self.total_hops.load(Ordering::Relaxed) as f64 / flattened as f64
    }

    /// Failure count per upstream label, sorted by label.
    pub fn failures_by_server(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .failures_by_server
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        counts.sort();
        counts
    }
}
