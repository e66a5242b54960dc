use super::RecordTypeMapper;
use ferrous_flatten_domain::{normalize_name, DnsQuery};
use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::RData;

/// The single question of a standard query, if the domain model supports it.
pub fn extract_question(request: &Message) -> Option<DnsQuery> {
    if request.message_type() != MessageType::Query || request.op_code() != OpCode::Query {
        return None;
    }

    let [question] = request.queries() else {
        return None;
    };

    let record_type = RecordTypeMapper::from_hickory(question.query_type())?;
    let record_class = RecordTypeMapper::class_from_hickory(question.query_class())?;

    Some(DnsQuery::with_class(
        question.name().to_ascii(),
        record_type,
        record_class,
    ))
}

/// True when the reply aliases the queried name instead of answering it.
pub fn is_alias_response(reply: &Message, query: &DnsQuery) -> bool {
    reply.answers().iter().any(|record| {
        matches!(record.data(), RData::CNAME(_))
            && normalize_name(&record.name().to_ascii()) == *query.domain
    })
}
