use super::messages::{rcode_message, reply_to};
use async_trait::async_trait;
use ferrous_flatten_application::ports::UpstreamForwarder;
use ferrous_flatten_domain::{normalize_name, DomainError, UpstreamTarget};
use hickory_proto::op::{Message, ResponseCode};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Scripted upstream pool. Replies are keyed by normalized query name and
/// shared by every healthy target.
pub struct MockForwarder {
    targets: Vec<UpstreamTarget>,
    replies: RwLock<HashMap<String, Message>>,
    unreachable: RwLock<HashSet<usize>>,
    malformed: RwLock<HashSet<usize>>,
    unavailable: RwLock<HashSet<usize>>,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
    attempts: Mutex<Vec<(usize, String)>>,
}

impl MockForwarder {
    pub fn new(target_count: usize) -> Self {
        let targets = (0..target_count)
            .map(|i| UpstreamTarget::new(format!("192.0.2.{}:53", i + 10).parse().unwrap()))
            .collect();
        Self {
            targets,
            replies: RwLock::new(HashMap::new()),
            unreachable: RwLock::new(HashSet::new()),
            malformed: RwLock::new(HashSet::new()),
            unavailable: RwLock::new(HashSet::new()),
            delay: RwLock::new(None),
            calls: AtomicUsize::new(0),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_replies(self, replies: Vec<(&str, Message)>) -> Self {
        for (domain, reply) in replies {
            self.set_reply(domain, reply);
        }
        self
    }

    pub fn set_reply(&self, domain: &str, reply: Message) {
        self.replies
            .write()
            .unwrap()
            .insert(normalize_name(domain), reply);
    }

    pub fn set_unreachable(&self, index: usize) {
        self.unreachable.write().unwrap().insert(index);
    }

    pub fn set_all_unreachable(&self) {
        for index in 0..self.targets.len() {
            self.set_unreachable(index);
        }
    }

    pub fn set_malformed(&self, index: usize) {
        self.malformed.write().unwrap().insert(index);
    }

    pub fn set_unavailable(&self, index: usize) {
        self.unavailable.write().unwrap().insert(index);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap() = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(target index, query name)` per attempt, in order.
    pub fn attempts(&self) -> Vec<(usize, String)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn queried_names(&self) -> Vec<String> {
        self.attempts().into_iter().map(|(_, name)| name).collect()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl UpstreamForwarder for MockForwarder {
    fn targets(&self) -> &[UpstreamTarget] {
        &self.targets
    }

    fn is_available(&self, index: usize) -> bool {
        !self.unavailable.read().unwrap().contains(&index)
    }

    async fn query_target(&self, index: usize, request: &Message) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let qname = request
            .queries()
            .first()
            .map(|q| normalize_name(&q.name().to_ascii()))
            .unwrap_or_default();
        self.attempts.lock().unwrap().push((index, qname.clone()));

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unreachable.read().unwrap().contains(&index) {
            return Err(DomainError::Unreachable {
                server: self.targets[index].label(),
                reason: "timed out".to_string(),
            });
        }
        if self.malformed.read().unwrap().contains(&index) {
            return Err(DomainError::MalformedReply(format!(
                "id mismatch from {}",
                self.targets[index].label()
            )));
        }

        let template = self
            .replies
            .read()
            .unwrap()
            .get(&qname)
            .cloned()
            .unwrap_or_else(|| rcode_message(ResponseCode::NXDomain));
        Ok(reply_to(request, &template))
    }
}
