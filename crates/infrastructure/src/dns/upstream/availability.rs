use dashmap::DashMap;
use ferrous_flatten_domain::config::{AvailabilityMode, FlatteningConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest a target can stay flagged when its expiry does not fit an `Instant`.
const MAX_FLAG_WINDOW: Duration = Duration::from_secs(86_400);

/// Decides whether a target should be skipped after recent failures.
///
/// State is keyed by target index and updated after every attempt; reads
/// and writes may come from any number of concurrent requests.
pub trait AvailabilityStrategy: Send + Sync {
    fn is_available(&self, index: usize) -> bool;

    fn record_success(&self, index: usize);

    /// `expire` is how long the target stays unavailable once flagged.
    fn record_failure(&self, index: usize, expire: Duration);

    /// Indexes currently flagged unavailable.
    fn flagged(&self) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

pub fn availability_strategy(config: &FlatteningConfig) -> Arc<dyn AvailabilityStrategy> {
    match config.availability {
        AvailabilityMode::Flag => Arc::new(ExpiringFlag::new()),
        AvailabilityMode::Threshold => Arc::new(FailureThreshold::new(config.failure_threshold)),
    }
}

/// End of an expiry window starting now, clamped to [`MAX_FLAG_WINDOW`].
fn flag_until(expire: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(expire).unwrap_or(now + MAX_FLAG_WINDOW)
}

/// One failure flags the target until its expiry window has passed.
#[derive(Default)]
pub struct ExpiringFlag {
    unavailable_until: DashMap<usize, Instant>,
}

impl ExpiringFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AvailabilityStrategy for ExpiringFlag {
    fn is_available(&self, index: usize) -> bool {
        self.unavailable_until
            .get(&index)
            .is_none_or(|until| Instant::now() >= *until)
    }

    fn record_success(&self, index: usize) {
        self.unavailable_until.remove(&index);
    }

    fn record_failure(&self, index: usize, expire: Duration) {
        self.unavailable_until.insert(index, flag_until(expire));
    }

    fn flagged(&self) -> Vec<usize> {
        let now = Instant::now();
        let mut flagged: Vec<usize> = self
            .unavailable_until
            .iter()
            .filter(|entry| now < *entry.value())
            .map(|entry| *entry.key())
            .collect();
        flagged.sort_unstable();
        flagged
    }

    fn name(&self) -> &'static str {
        "flag"
    }
}

#[derive(Debug, Clone, Default)]
struct TargetHealth {
    consecutive_failures: u8,
    unavailable_until: Option<Instant>,
}

impl TargetHealth {
    fn is_flagged(&self, now: Instant) -> bool {
        self.unavailable_until.is_some_and(|until| now < until)
    }
}

/// `threshold` consecutive failures flag the target for its expiry window.
/// A single success clears the count.
pub struct FailureThreshold {
    health: DashMap<usize, TargetHealth>,
    threshold: u8,
}

impl FailureThreshold {
    pub fn new(threshold: u8) -> Self {
        Self {
            health: DashMap::new(),
            threshold: threshold.max(1),
        }
    }

    pub fn consecutive_failures(&self, index: usize) -> u8 {
        self.health
            .get(&index)
            .map_or(0, |h| h.consecutive_failures)
    }
}

impl AvailabilityStrategy for FailureThreshold {
    fn is_available(&self, index: usize) -> bool {
        self.health
            .get(&index)
            .is_none_or(|h| !h.is_flagged(Instant::now()))
    }

    fn record_success(&self, index: usize) {
        self.health.remove(&index);
    }

    fn record_failure(&self, index: usize, expire: Duration) {
        let mut entry = self.health.entry(index).or_default();
        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        if entry.consecutive_failures >= self.threshold {
            entry.unavailable_until = Some(flag_until(expire));
        }
    }

    fn flagged(&self) -> Vec<usize> {
        let now = Instant::now();
        let mut flagged: Vec<usize> = self
            .health
            .iter()
            .filter(|entry| entry.value().is_flagged(now))
            .map(|entry| *entry.key())
            .collect();
        flagged.sort_unstable();
        flagged
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}
