pub mod dns;

pub use dns::FlattenServices;
