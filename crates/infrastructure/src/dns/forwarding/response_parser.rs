use ferrous_flatten_domain::DomainError;
use hickory_proto::op::{Message, MessageType};
use tracing::debug;

pub struct ResponseParser;

impl ResponseParser {
    /// Decode an upstream reply and check it answers `attempt`.
    ///
    /// The id must match, the QR bit must be set and the question section
    /// must echo the one sent. Anything else is `MalformedReply`.
    pub fn parse(response_bytes: &[u8], attempt: &Message) -> Result<Message, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::MalformedReply(format!("Failed to parse DNS response: {}", e))
        })?;

        if message.id() != attempt.id() {
            return Err(DomainError::MalformedReply(format!(
                "id mismatch: sent {}, received {}",
                attempt.id(),
                message.id()
            )));
        }

        if message.message_type() != MessageType::Response {
            return Err(DomainError::MalformedReply(
                "reply does not have the QR bit set".to_string(),
            ));
        }

        if message.queries() != attempt.queries() {
            return Err(DomainError::MalformedReply(
                "question section does not match the query".to_string(),
            ));
        }

        debug!(
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            truncated = message.truncated(),
            "DNS response parsed"
        );

        Ok(message)
    }
}
