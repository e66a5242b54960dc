use super::chain_flattener::FlattenedResult;
use super::RecordTypeMapper;
use ferrous_flatten_domain::{DnsQuery, DomainError};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::Name;
use std::str::FromStr;

/// Standard recursive query with a random id and a single question.
pub fn build_query(query: &DnsQuery) -> Result<Message, DomainError> {
    let name = Name::from_str(&query.domain).map_err(|e| {
        DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", query.domain, e))
    })?;

    let mut question = Query::new();
    question.set_name(name);
    question.set_query_type(RecordTypeMapper::to_hickory(query.record_type));
    question.set_query_class(RecordTypeMapper::class_to_hickory(query.record_class));

    let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(question);
    Ok(message)
}

/// Reply to `request` carrying the flattened records as its only answers.
pub fn build_flattened_response(request: &Message, result: &FlattenedResult) -> Message {
    let mut response = response_skeleton(request, ResponseCode::NoError);
    response.add_answers(result.records.iter().cloned());
    response
}

/// Empty reply to `request` with the given response code.
pub fn build_error_response(request: &Message, code: ResponseCode) -> Message {
    response_skeleton(request, code)
}

fn response_skeleton(request: &Message, code: ResponseCode) -> Message {
    let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
    response.set_recursion_desired(request.recursion_desired());
    response.set_recursion_available(true);
    response.set_response_code(code);
    response.add_queries(request.queries().iter().cloned());
    if let Some(edns) = request.extensions() {
        response.set_edns(edns.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_flatten_domain::RecordType;
    use hickory_proto::op::Edns;

    #[test]
    fn test_build_query_sets_rd_and_question() {
        let query = DnsQuery::new("example.com", RecordType::AAAA);
        let message = build_query(&query).unwrap();

        assert!(message.recursion_desired());
        assert_eq!(message.message_type(), MessageType::Query);
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].name().to_ascii(), "example.com.");
        assert_eq!(
            message.queries()[0].query_type(),
            hickory_proto::rr::RecordType::AAAA
        );
    }

    #[test]
    fn test_error_response_echoes_request() {
        let request = build_query(&DnsQuery::new("example.com", RecordType::A)).unwrap();
        let response = build_error_response(&request, ResponseCode::ServFail);

        assert_eq!(response.id(), request.id());
        assert_eq!(response.message_type(), MessageType::Response);
        assert_eq!(response.response_code(), ResponseCode::ServFail);
        assert_eq!(response.queries(), request.queries());
        assert!(response.answers().is_empty());
        assert!(response.recursion_available());
        assert!(response.extensions().is_none());
    }

    #[test]
    fn test_responses_keep_request_edns() {
        let mut request = build_query(&DnsQuery::new("example.com", RecordType::A)).unwrap();
        let mut edns = Edns::new();
        edns.set_max_payload(1232);
        request.set_edns(edns);

        let result = FlattenedResult {
            query: DnsQuery::new("example.com", RecordType::A),
            records: Vec::new(),
            effective_ttl: 60,
        };
        let flattened = build_flattened_response(&request, &result);
        let failed = build_error_response(&request, ResponseCode::ServFail);

        for response in [flattened, failed] {
            let edns = response.extensions().as_ref().expect("OPT record echoed");
            assert_eq!(edns.max_payload(), 1232);
        }
    }
}
