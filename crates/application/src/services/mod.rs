mod chain_flattener;
mod failover;
mod pipeline;
mod question;
mod record_type_map;
mod response_builder;
mod response_interceptor;

pub use chain_flattener::{ChainFlattener, FlattenOutcome, FlattenedResult};
pub use failover::forward_with_failover;
pub use pipeline::next_or_failure;
pub use question::{extract_question, is_alias_response};
pub use record_type_map::RecordTypeMapper;
pub use response_builder::{build_error_response, build_flattened_response, build_query};
pub use response_interceptor::ResponseInterceptor;
