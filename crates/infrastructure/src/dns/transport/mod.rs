pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use ferrous_flatten_domain::DomainError;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub(crate) fn unreachable(server: std::net::SocketAddr, reason: impl Into<String>) -> DomainError {
    DomainError::Unreachable {
        server: format!("dns://{}", server),
        reason: reason.into(),
    }
}
