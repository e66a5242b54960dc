use super::{build_query, forward_with_failover, RecordTypeMapper};
use crate::ports::{FlattenEventSink, RequestContext, UpstreamForwarder};
use ferrous_flatten_domain::{normalize_name, ChainHop, DnsQuery, DomainError, ResolutionChain};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, RData, Record};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminal answer for the originally queried name.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedResult {
    pub query: DnsQuery,
    /// Terminal records re-owned by `query.domain`, each carrying `effective_ttl`.
    pub records: Vec<Record>,
    pub effective_ttl: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlattenOutcome {
    pub result: FlattenedResult,
    pub chain: ResolutionChain,
}

/// Walks an alias chain to its terminal records.
///
/// Hops already present in a reply are followed without another round-trip;
/// every missing hop costs one failover walk over the forwarder pool. Each
/// hop goes through [`ResolutionChain::push`], so a repeated name or a chain
/// longer than `max_depth` stops the walk before any further query is sent.
pub struct ChainFlattener {
    forwarder: Arc<dyn UpstreamForwarder>,
    max_depth: usize,
    events: Option<Arc<dyn FlattenEventSink>>,
}

impl ChainFlattener {
    pub fn new(forwarder: Arc<dyn UpstreamForwarder>, max_depth: usize) -> Self {
        Self {
            forwarder,
            max_depth,
            events: None,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn FlattenEventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn flatten(
        &self,
        ctx: &RequestContext,
        query: &DnsQuery,
        first_response: &Message,
    ) -> Result<FlattenOutcome, DomainError> {
        let mut chain = ResolutionChain::new(self.max_depth);

        match self.walk(ctx, query, first_response, &mut chain).await {
            Ok(result) => {
                debug!(
                    domain = %query.domain,
                    chain = %chain.describe(),
                    hops = chain.len(),
                    ttl = result.effective_ttl,
                    "Alias chain flattened"
                );
                Ok(FlattenOutcome { result, chain })
            }
            Err(e) => {
                warn!(
                    domain = %query.domain,
                    chain = %chain.describe(),
                    hops = chain.len(),
                    stopped_at = chain.terminal_name().unwrap_or(&query.domain),
                    error = %e,
                    "Alias chain not flattened"
                );
                Err(e)
            }
        }
    }

    async fn walk(
        &self,
        ctx: &RequestContext,
        query: &DnsQuery,
        first_response: &Message,
        chain: &mut ResolutionChain,
    ) -> Result<FlattenedResult, DomainError> {
        let mut fetched: Option<Message> = None;
        let mut name = Arc::clone(&query.domain);

        loop {
            let reply = fetched.as_ref().unwrap_or(first_response);

            if fetched.is_some() && reply.response_code() != ResponseCode::NoError {
                return Err(DomainError::ChainResolutionFailed(format!(
                    "upstream answered {} for {}",
                    reply.response_code(),
                    name
                )));
            }

            let hops_before = chain.len();
            name = follow_aliases(chain, reply, name)?;

            let terminal = terminal_records(reply, &name, query);
            if !terminal.is_empty() {
                return compose(query, chain, &terminal);
            }

            if chain.is_empty() {
                return Err(DomainError::ChainResolutionFailed(format!(
                    "response for {} carries no alias",
                    query.domain
                )));
            }
            if fetched.is_some() && chain.len() == hops_before {
                return Err(DomainError::ChainResolutionFailed(format!(
                    "no {} records for {}",
                    query.record_type, name
                )));
            }

            fetched = Some(self.resolve_hop(ctx, query, &name).await?);
        }
    }

    async fn resolve_hop(
        &self,
        ctx: &RequestContext,
        query: &DnsQuery,
        name: &str,
    ) -> Result<Message, DomainError> {
        debug!(domain = %query.domain, target = %name, "Resolving alias target");

        let hop_query = query.for_target(name);
        let result = match build_query(&hop_query) {
            Ok(request) => {
                ctx.run(forward_with_failover(
                    self.forwarder.as_ref(),
                    &request,
                    self.events.as_deref(),
                ))
                .await
            }
            Err(e) => Err(e),
        };

        result.map_err(|e| match e {
            DomainError::AllTargetsUnreachable | DomainError::QueryTimeout => e,
            other => DomainError::ChainResolutionFailed(format!("hop {}: {}", name, other)),
        })
    }
}

/// Append every hop the reply already carries, starting at `name`.
/// Returns the name the last hop points at.
fn follow_aliases(
    chain: &mut ResolutionChain,
    reply: &Message,
    mut name: Arc<str>,
) -> Result<Arc<str>, DomainError> {
    while let Some((target, ttl)) = find_alias(reply, &name) {
        let hop = ChainHop::new(&*name, target, ttl);
        let next = Arc::clone(&hop.target);
        debug!(owner = %hop.owner, target = %hop.target, ttl, "Alias hop");
        chain.push(hop)?;
        name = next;
    }
    Ok(name)
}

fn find_alias(reply: &Message, owner: &str) -> Option<(String, u32)> {
    reply.answers().iter().find_map(|record| match record.data() {
        RData::CNAME(canonical) if normalize_name(&record.name().to_ascii()) == owner => {
            Some((canonical.to_ascii(), record.ttl()))
        }
        _ => None,
    })
}

fn terminal_records<'a>(reply: &'a Message, name: &str, query: &DnsQuery) -> Vec<&'a Record> {
    let wanted = RecordTypeMapper::to_hickory(query.record_type);
    reply
        .answers()
        .iter()
        .filter(|r| r.record_type() == wanted && normalize_name(&r.name().to_ascii()) == name)
        .collect()
}

fn compose(
    query: &DnsQuery,
    chain: &ResolutionChain,
    terminal: &[&Record],
) -> Result<FlattenedResult, DomainError> {
    let owner = Name::from_str(&query.domain).map_err(|e| {
        DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", query.domain, e))
    })?;

    let terminal_ttl = terminal.iter().map(|r| r.ttl()).min().unwrap_or(0);
    let effective_ttl = chain.effective_ttl(terminal_ttl);

    let records = terminal
        .iter()
        .map(|record| {
            let mut record = (*record).clone();
            record.set_name(owner.clone());
            record.set_ttl(effective_ttl);
            record
        })
        .collect();

    Ok(FlattenedResult {
        query: query.clone(),
        records,
        effective_ttl,
    })
}
