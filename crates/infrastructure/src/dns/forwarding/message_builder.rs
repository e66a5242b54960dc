//! DNS Message Builder
//!
//! Turns a pipeline request into the bytes of one upstream attempt. Each
//! attempt gets a fresh random id so a late reply to an earlier attempt can
//! never be mistaken for the current one.

use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

pub struct MessageBuilder;

impl MessageBuilder {
    /// Copy `request` under a new random id and serialize it.
    ///
    /// Returns the attempt message (needed to validate the reply) and its
    /// wire bytes.
    pub fn prepare_attempt(request: &Message) -> Result<(Message, Vec<u8>), DomainError> {
        let mut attempt = request.clone();
        Self::assign_id(&mut attempt, fastrand::u16(..));
        let bytes = Self::serialize_message(&attempt)?;
        Ok((attempt, bytes))
    }

    /// Rewrite the transaction id. `Message` only exposes its header by value.
    pub fn assign_id(message: &mut Message, id: u16) {
        let mut header = *message.header();
        header.set_id(id);
        message.set_header(header);
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
