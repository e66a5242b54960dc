use ferrous_flatten_domain::{DomainError, UpstreamProtocol, UpstreamTarget, DEFAULT_EXPIRE};
use std::time::Duration;

#[test]
fn test_parse_plain_ip_uses_default_port() {
    let target: UpstreamTarget = "8.8.8.8".parse().unwrap();
    assert_eq!(target.addr.to_string(), "8.8.8.8:53");
    assert_eq!(target.expire, DEFAULT_EXPIRE);
}

#[test]
fn test_parse_ip_with_port() {
    let target: UpstreamTarget = "1.1.1.1:5353".parse().unwrap();
    assert_eq!(target.addr.port(), 5353);
}

#[test]
fn test_parse_dns_scheme() {
    let target: UpstreamTarget = "dns://9.9.9.9:53".parse().unwrap();
    assert_eq!(target.label(), "dns://9.9.9.9:53");
}

#[test]
fn test_parse_bracketed_ipv6() {
    let target: UpstreamTarget = "[2001:4860:4860::8888]".parse().unwrap();
    assert!(target.addr.is_ipv6());
    assert_eq!(target.addr.port(), 53);
}

#[test]
fn test_rejects_tls_transport() {
    let err = "tls://1.1.1.1:853".parse::<UpstreamTarget>().unwrap_err();
    match err {
        DomainError::ConfigError(msg) => assert!(msg.contains("only dns transport allowed")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_rejects_tcp_transport() {
    let err = "tcp://1.1.1.1".parse::<UpstreamTarget>().unwrap_err();
    match err {
        DomainError::ConfigError(msg) => assert!(msg.contains("only dns transport allowed")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        UpstreamProtocol::split_endpoint("TCP://1.1.1.1").unwrap().0,
        UpstreamProtocol::Tcp
    );
}

#[test]
fn test_rejects_https_transport() {
    assert!("https://dns.google/dns-query"
        .parse::<UpstreamTarget>()
        .is_err());
}

#[test]
fn test_rejects_hostname() {
    assert!("dns.google:53".parse::<UpstreamTarget>().is_err());
}

#[test]
fn test_split_endpoint_schemes() {
    assert_eq!(
        UpstreamProtocol::split_endpoint("udp://1.1.1.1").unwrap().0,
        UpstreamProtocol::Dns
    );
    assert_eq!(
        UpstreamProtocol::split_endpoint("quic://1.1.1.1").unwrap().0,
        UpstreamProtocol::Quic
    );
    assert!(UpstreamProtocol::split_endpoint("ftp://1.1.1.1").is_err());
}

#[test]
fn test_builder_overrides_timing() {
    let target = UpstreamTarget::new("127.0.0.1:53".parse().unwrap())
        .with_expire(Duration::from_secs(30))
        .with_attempt_timeout(Duration::from_millis(250));
    assert_eq!(target.expire, Duration::from_secs(30));
    assert_eq!(target.attempt_timeout, Duration::from_millis(250));
}
