use async_trait::async_trait;
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;

/// Destination of a handler's reply. The server adapter sends to the
/// client; the interceptor keeps the message instead.
#[async_trait]
pub trait ResponseWriter: Send {
    async fn write_msg(&mut self, message: &Message) -> Result<(), DomainError>;
}
