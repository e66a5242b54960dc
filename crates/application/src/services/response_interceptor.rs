use crate::ports::ResponseWriter;
use async_trait::async_trait;
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;

/// Writer handed to the next handler in place of the client's writer.
///
/// Keeps the first message written and rejects any later one, so at most
/// one message is ever captured per request and nothing reaches the wire.
#[derive(Debug, Default)]
pub struct ResponseInterceptor {
    captured: Option<Message>,
}

impl ResponseInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_captured(self) -> Option<Message> {
        self.captured
    }
}

#[async_trait]
impl ResponseWriter for ResponseInterceptor {
    async fn write_msg(&mut self, message: &Message) -> Result<(), DomainError> {
        if self.captured.is_some() {
            return Err(DomainError::DuplicateResponse);
        }
        self.captured = Some(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{MessageType, OpCode};

    #[tokio::test]
    async fn test_captures_first_write_only() {
        assert!(ResponseInterceptor::new().into_captured().is_none());

        let mut interceptor = ResponseInterceptor::new();

        let first = Message::new(1, MessageType::Response, OpCode::Query);
        let second = Message::new(2, MessageType::Response, OpCode::Query);

        interceptor.write_msg(&first).await.unwrap();
        let err = interceptor.write_msg(&second).await.unwrap_err();
        assert_eq!(err, DomainError::DuplicateResponse);

        assert_eq!(interceptor.into_captured().map(|m| m.id()), Some(1));
    }
}
