//! Ferrous Flatten Infrastructure Layer
//!
//! Wire codec, UDP/TCP transports, the upstream forwarder pool with its
//! availability tracking, event plumbing, and the server adapter.

pub mod dns;
