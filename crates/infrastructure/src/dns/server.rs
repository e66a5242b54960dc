use crate::dns::forwarding::MessageBuilder;
use crate::dns::transport::tcp::{read_with_length_prefix, send_with_length_prefix};
use async_trait::async_trait;
use ferrous_flatten_application::ports::{DnsHandler, RequestContext, ResponseWriter};
use ferrous_flatten_application::services::build_error_response;
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Largest UDP reply sent to a client that did not advertise EDNS(0).
const MAX_PLAIN_UDP_PAYLOAD: usize = 512;

/// Idle limit for an inbound TCP connection between two queries.
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Holds the encoded reply of one request until the server sends it.
#[derive(Debug, Default)]
pub struct BufferedWriter {
    bytes: Option<Vec<u8>>,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        self.bytes
    }
}

#[async_trait]
impl ResponseWriter for BufferedWriter {
    async fn write_msg(&mut self, message: &Message) -> Result<(), DomainError> {
        if self.bytes.is_some() {
            return Err(DomainError::DuplicateResponse);
        }
        let bytes = MessageBuilder::serialize_message(message)
            .map_err(|e| DomainError::WriteFailed(e.to_string()))?;
        self.bytes = Some(bytes);
        Ok(())
    }
}

/// Feeds raw datagrams and TCP frames into a handler chain.
pub struct DnsServer {
    handler: Arc<dyn DnsHandler>,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl DnsServer {
    pub fn new(
        handler: Arc<dyn DnsHandler>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            handler,
            request_timeout,
            shutdown,
        }
    }

    /// Answer one wire-format request. `None` means nothing should be sent
    /// back (undecodable input or a message that is not a query).
    pub async fn handle_packet(&self, packet: &[u8]) -> Option<Vec<u8>> {
        let request = match Message::from_vec(packet) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, len = packet.len(), "Dropping undecodable request");
                return None;
            }
        };

        if request.message_type() != MessageType::Query {
            debug!(id = request.id(), "Dropping non-query message");
            return None;
        }

        let ctx = RequestContext::with_timeout(&self.shutdown, self.request_timeout);
        let mut writer = BufferedWriter::new();

        let written = match self.handler.serve_dns(&ctx, &mut writer, &request).await {
            Ok(()) => writer.into_bytes(),
            Err(e) => {
                warn!(
                    id = request.id(),
                    handler = self.handler.name(),
                    status = e.status,
                    error = %e.error,
                    "Handler failed"
                );
                None
            }
        };

        written.or_else(|| {
            MessageBuilder::serialize_message(&build_error_response(
                &request,
                ResponseCode::ServFail,
            ))
            .map_err(|e| error!(error = %e, "Failed to encode SERVFAIL"))
            .ok()
        })
    }

    pub async fn serve_udp(self: Arc<Self>, socket: Arc<UdpSocket>) {
        let mut recv_buf = [0u8; 4096];

        loop {
            let (len, peer) = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = socket.recv_from(&mut recv_buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        error!(error = %e, "UDP recv error");
                        continue;
                    }
                },
            };

            let packet = recv_buf[..len].to_vec();
            let server = Arc::clone(&self);
            let socket = Arc::clone(&socket);
            tokio::spawn(async move {
                if let Some(response) = server.handle_packet(&packet).await {
                    let response = fit_udp_payload(&packet, response);
                    if let Err(e) = socket.send_to(&response, peer).await {
                        debug!(client = %peer, error = %e, "UDP send failed");
                    }
                }
            });
        }

        info!("UDP listener stopped");
    }

    pub async fn serve_tcp(self: Arc<Self>, listener: TcpListener) {
        loop {
            let (stream, peer) = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = listener.accept() => match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!(error = %e, "TCP accept error");
                        continue;
                    }
                },
            };

            let server = Arc::clone(&self);
            tokio::spawn(async move {
                server.serve_connection(stream, peer).await;
            });
        }

        info!("TCP listener stopped");
    }

    async fn serve_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                frame = tokio::time::timeout(TCP_IDLE_TIMEOUT, read_with_length_prefix(&mut stream)) => frame,
            };

            let packet = match frame {
                Ok(Ok(packet)) => packet,
                Ok(Err(_)) | Err(_) => {
                    debug!(client = %peer, "TCP connection closed");
                    return;
                }
            };

            let Some(response) = self.handle_packet(&packet).await else {
                continue;
            };
            if let Err(e) = send_with_length_prefix(&mut stream, &response).await {
                debug!(client = %peer, error = %e, "TCP send failed");
                return;
            }
        }
    }
}

/// Replace an oversized reply with a header-only truncated one when the
/// client did not advertise a larger buffer (no additional records, so no
/// OPT pseudo-record).
fn fit_udp_payload(request: &[u8], response: Vec<u8>) -> Vec<u8> {
    let has_additional = request.len() >= 12 && (request[10] != 0 || request[11] != 0);
    if has_additional || response.len() <= MAX_PLAIN_UDP_PAYLOAD {
        return response;
    }

    let Ok(message) = Message::from_vec(&response) else {
        return response;
    };
    let mut truncated = build_error_response(&message, message.response_code());
    truncated.set_truncated(true);
    MessageBuilder::serialize_message(&truncated).unwrap_or(response)
}
