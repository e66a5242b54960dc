use super::availability::{availability_strategy, AvailabilityStrategy, ExpiringFlag};
use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use crate::dns::transport::{tcp::TcpTransport, udp::UdpTransport, DnsTransport};
use async_trait::async_trait;
use ferrous_flatten_application::ports::UpstreamForwarder;
use ferrous_flatten_domain::config::{ConfigError, FlatteningConfig};
use ferrous_flatten_domain::{DomainError, UpstreamTarget};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Read-only set of upstream targets plus their availability state.
///
/// One `query_target` call is a single attempt: UDP first, TCP when the UDP
/// reply is truncated. Every outcome is reported to the availability
/// strategy so later requests can skip a failing target.
pub struct ForwarderPool {
    name: &'static str,
    targets: Vec<UpstreamTarget>,
    availability: Arc<dyn AvailabilityStrategy>,
}

impl ForwarderPool {
    pub fn new(
        name: &'static str,
        targets: Vec<UpstreamTarget>,
        availability: Arc<dyn AvailabilityStrategy>,
    ) -> Self {
        Self {
            name,
            targets,
            availability,
        }
    }

    /// Pool with the default one-failure flag.
    pub fn with_targets(name: &'static str, targets: Vec<UpstreamTarget>) -> Self {
        Self::new(name, targets, Arc::new(ExpiringFlag::new()))
    }

    pub fn from_flattening_config(config: &FlatteningConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            "flattening",
            config.targets()?,
            availability_strategy(config),
        ))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn availability(&self) -> &Arc<dyn AvailabilityStrategy> {
        &self.availability
    }

    /// Indexes currently flagged unavailable.
    pub fn flagged_targets(&self) -> Vec<usize> {
        self.availability.flagged()
    }

    pub fn on_startup(&self) {
        for (index, target) in self.targets.iter().enumerate() {
            debug!(
                pool = self.name,
                index,
                server = %target,
                expire_s = target.expire.as_secs(),
                timeout_ms = target.attempt_timeout.as_millis() as u64,
                "Upstream configured"
            );
        }
        info!(
            pool = self.name,
            targets = self.targets.len(),
            availability = self.availability.name(),
            "Upstream pool ready"
        );
    }

    async fn exchange(
        &self,
        target: &UpstreamTarget,
        attempt: &Message,
        bytes: &[u8],
    ) -> Result<(Message, &'static str), DomainError> {
        let udp = UdpTransport::new(target.addr);
        let response = udp.send(bytes, target.attempt_timeout).await?;
        let reply = ResponseParser::parse(&response.bytes, attempt)?;

        if !reply.truncated() {
            return Ok((reply, response.protocol_used));
        }

        debug!(server = %target, "Truncated UDP reply, retrying over TCP");
        let tcp = TcpTransport::new(target.addr);
        let response = tcp.send(bytes, target.attempt_timeout).await?;
        let reply = ResponseParser::parse(&response.bytes, attempt)?;
        Ok((reply, response.protocol_used))
    }
}

#[async_trait]
impl UpstreamForwarder for ForwarderPool {
    fn targets(&self) -> &[UpstreamTarget] {
        &self.targets
    }

    fn is_available(&self, index: usize) -> bool {
        self.availability.is_available(index)
    }

    async fn query_target(&self, index: usize, request: &Message) -> Result<Message, DomainError> {
        let target = self.targets.get(index).ok_or_else(|| {
            DomainError::ConfigError(format!("pool {} has no target {}", self.name, index))
        })?;

        let (attempt, bytes) = MessageBuilder::prepare_attempt(request)?;
        let start = Instant::now();

        match self.exchange(target, &attempt, &bytes).await {
            Ok((mut reply, protocol)) => {
                self.availability.record_success(index);
                debug!(
                    pool = self.name,
                    server = %target,
                    protocol,
                    latency_ms = start.elapsed().as_millis() as u64,
                    rcode = ?reply.response_code(),
                    "Upstream attempt succeeded"
                );
                MessageBuilder::assign_id(&mut reply, request.id());
                Ok(reply)
            }
            Err(e) => {
                if e.is_transport_error() {
                    self.availability.record_failure(index, target.expire);
                }
                warn!(pool = self.name, server = %target, error = %e, "Upstream attempt failed");
                Err(e)
            }
        }
    }
}
