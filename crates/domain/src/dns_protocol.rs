use crate::errors::DomainError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Default window a failed target stays flagged unavailable.
pub const DEFAULT_EXPIRE: Duration = Duration::from_secs(10);

const DEFAULT_DNS_PORT: u16 = 53;

/// Wire transport named by an upstream endpoint's scheme.
///
/// Only `Dns` (UDP with TCP fallback on truncation) is served; the others are
/// recognised so configuration can reject them with a clear message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamProtocol {
    Dns,
    /// TCP-only transport, without the UDP first attempt.
    Tcp,
    Tls,
    Https,
    Grpc,
    Quic,
}

impl UpstreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamProtocol::Dns => "dns",
            UpstreamProtocol::Tcp => "tcp",
            UpstreamProtocol::Tls => "tls",
            UpstreamProtocol::Https => "https",
            UpstreamProtocol::Grpc => "grpc",
            UpstreamProtocol::Quic => "quic",
        }
    }

    /// Splits `scheme://rest` into its protocol and the remaining host part.
    pub fn split_endpoint(endpoint: &str) -> Result<(Self, &str), String> {
        let Some((scheme, rest)) = endpoint.split_once("://") else {
            return Ok((UpstreamProtocol::Dns, endpoint));
        };
        let protocol = match scheme.to_ascii_lowercase().as_str() {
            "dns" | "udp" => UpstreamProtocol::Dns,
            "tcp" => UpstreamProtocol::Tcp,
            "tls" => UpstreamProtocol::Tls,
            "https" => UpstreamProtocol::Https,
            "grpc" => UpstreamProtocol::Grpc,
            "quic" | "doq" => UpstreamProtocol::Quic,
            other => return Err(format!("Unknown transport scheme '{}'", other)),
        };
        Ok((protocol, rest))
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One configured upstream resolver. Read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamTarget {
    pub addr: SocketAddr,
    pub expire: Duration,
    pub attempt_timeout: Duration,
}

impl UpstreamTarget {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            expire: DEFAULT_EXPIRE,
            attempt_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_expire(mut self, expire: Duration) -> Self {
        self.expire = expire;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn label(&self) -> String {
        format!("dns://{}", self.addr)
    }
}

impl FromStr for UpstreamTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (protocol, host) = UpstreamProtocol::split_endpoint(s.trim())
            .map_err(DomainError::ConfigError)?;

        if protocol != UpstreamProtocol::Dns {
            return Err(DomainError::ConfigError(format!(
                "only dns transport allowed, got {} for '{}'",
                protocol, s
            )));
        }

        let addr = parse_host_port(host).ok_or_else(|| {
            DomainError::ConfigError(format!(
                "Invalid upstream '{}'. Expected IP, IP:PORT or dns://IP:PORT",
                s
            ))
        })?;

        Ok(Self::new(addr))
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn parse_host_port(s: &str) -> Option<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr);
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    inner
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
}
