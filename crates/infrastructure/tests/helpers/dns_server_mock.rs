use ferrous_flatten_domain::normalize_name;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, CNAME};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// Records served by a mock, keyed by owner name. Each name answers with
/// exactly the records it owns; nothing is followed.
#[derive(Clone, Default)]
pub struct Zone {
    records: HashMap<String, Vec<Record>>,
}

impl Zone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cname(mut self, owner: &str, target: &str, ttl: u32) -> Self {
        let record = Record::from_rdata(
            Name::from_str(owner).unwrap(),
            ttl,
            RData::CNAME(CNAME(Name::from_str(target).unwrap())),
        );
        self.records
            .entry(normalize_name(owner))
            .or_default()
            .push(record);
        self
    }

    pub fn a(mut self, owner: &str, ip: &str, ttl: u32) -> Self {
        let record = Record::from_rdata(
            Name::from_str(owner).unwrap(),
            ttl,
            RData::A(A(Ipv4Addr::from_str(ip).unwrap())),
        );
        self.records
            .entry(normalize_name(owner))
            .or_default()
            .push(record);
        self
    }

    fn answer(&self, request: &Message) -> Message {
        let mut reply = Message::new(request.id(), MessageType::Response, OpCode::Query);
        reply.set_recursion_desired(request.recursion_desired());
        reply.set_recursion_available(true);
        reply.add_queries(request.queries().iter().cloned());

        let qname = request
            .queries()
            .first()
            .map(|q| normalize_name(&q.name().to_ascii()))
            .unwrap_or_default();
        match self.records.get(&qname) {
            Some(records) => {
                reply.add_answers(records.iter().cloned());
            }
            None => {
                reply.set_response_code(ResponseCode::NXDomain);
            }
        }
        reply
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockBehavior {
    Answer,
    /// Never replies.
    Silent,
    /// Replies with a different transaction id.
    WrongId,
    /// UDP replies are empty with TC set; TCP answers in full.
    TruncateUdp,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(zone: Zone, behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = Arc::clone(&udp_queries);
        let tcp_count = Arc::clone(&tcp_queries);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_count.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = Self::udp_response(&zone, behavior, &buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            tcp_count.fetch_add(1, Ordering::SeqCst);
                            let zone = zone.clone();
                            tokio::spawn(async move {
                                let mut len_buf = [0u8; 2];
                                if stream.read_exact(&mut len_buf).await.is_err() {
                                    return;
                                }
                                let mut packet = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                                if stream.read_exact(&mut packet).await.is_err() {
                                    return;
                                }
                                let request = Message::from_vec(&packet).unwrap();
                                let response = zone.answer(&request).to_vec().unwrap();
                                let _ = stream.write_all(&(response.len() as u16).to_be_bytes()).await;
                                let _ = stream.write_all(&response).await;
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    fn udp_response(zone: &Zone, behavior: MockBehavior, packet: &[u8]) -> Option<Vec<u8>> {
        let request = Message::from_vec(packet).ok()?;
        let reply = match behavior {
            MockBehavior::Silent => return None,
            MockBehavior::Answer => zone.answer(&request),
            MockBehavior::WrongId => {
                let mut reply = zone.answer(&request);
                let mut header = *reply.header();
                header.set_id(request.id().wrapping_add(1));
                reply.set_header(header);
                reply
            }
            MockBehavior::TruncateUdp => {
                let mut reply = Message::new(request.id(), MessageType::Response, OpCode::Query);
                reply.add_queries(request.queries().iter().cloned());
                reply.set_truncated(true);
                reply
            }
        };
        reply.to_vec().ok()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Standard recursive query for `domain`.
pub fn query(id: u16, domain: &str, record_type: RecordType) -> Message {
    let mut question = Query::new();
    question.set_name(Name::from_str(domain).unwrap());
    question.set_query_type(record_type);
    question.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(question);
    message
}
