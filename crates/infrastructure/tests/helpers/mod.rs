#![allow(dead_code)]
#![allow(unused_imports)]

mod dns_server_mock;

pub use dns_server_mock::{query, MockBehavior, MockDnsServer, Zone};
