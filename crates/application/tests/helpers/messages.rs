use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, CNAME};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

pub fn cname_record(owner: &str, target: &str, ttl: u32) -> Record {
    Record::from_rdata(name(owner), ttl, RData::CNAME(CNAME(name(target))))
}

pub fn a_record(owner: &str, ip: &str, ttl: u32) -> Record {
    Record::from_rdata(name(owner), ttl, RData::A(A(Ipv4Addr::from_str(ip).unwrap())))
}

pub fn query_message(id: u16, domain: &str, record_type: RecordType) -> Message {
    let mut query = Query::new();
    query.set_name(name(domain));
    query.set_query_type(record_type);
    query.set_query_class(hickory_proto::rr::DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    message
}

/// Answer-only reply; the question and id are filled in by whoever sends it.
pub fn answer_message(answers: Vec<Record>) -> Message {
    let mut message = Message::new(0, MessageType::Response, OpCode::Query);
    message.set_recursion_available(true);
    message.add_answers(answers);
    message
}

pub fn rcode_message(code: ResponseCode) -> Message {
    let mut message = Message::new(0, MessageType::Response, OpCode::Query);
    message.set_response_code(code);
    message
}

/// `template` as a reply to `request`.
pub fn reply_to(request: &Message, template: &Message) -> Message {
    let mut reply = template.clone();
    let mut header = *reply.header();
    header.set_id(request.id());
    reply.set_header(header);
    reply.add_queries(request.queries().iter().cloned());
    reply
}

/// Replies for the standard test chain `a -> b -> c -> d -> e` under
/// `example.`, hop TTLs {60, 120, 90, 300}, terminal `e A 192.0.2.1` TTL 300.
pub fn standard_chain() -> Vec<(&'static str, Message)> {
    vec![
        (
            "a.example.",
            answer_message(vec![cname_record("a.example.", "b.example.", 60)]),
        ),
        (
            "b.example.",
            answer_message(vec![cname_record("b.example.", "c.example.", 120)]),
        ),
        (
            "c.example.",
            answer_message(vec![cname_record("c.example.", "d.example.", 90)]),
        ),
        (
            "d.example.",
            answer_message(vec![cname_record("d.example.", "e.example.", 300)]),
        ),
        (
            "e.example.",
            answer_message(vec![a_record("e.example.", "192.0.2.1", 300)]),
        ),
    ]
}
