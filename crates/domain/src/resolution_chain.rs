use crate::dns_query::normalize_name;
use crate::errors::DomainError;
use std::sync::Arc;

/// One alias link: `owner CNAME target`, valid for `ttl` seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHop {
    pub owner: Arc<str>,
    pub target: Arc<str>,
    pub ttl: u32,
}

impl ChainHop {
    pub fn new(owner: impl AsRef<str>, target: impl AsRef<str>, ttl: u32) -> Self {
        Self {
            owner: normalize_name(owner.as_ref()).into(),
            target: normalize_name(target.as_ref()).into(),
            ttl,
        }
    }
}

/// Ordered alias hops from the queried name towards a terminal name.
///
/// `push` keeps three invariants: the hops form a connected path, no owner
/// name repeats, and the chain never grows past `max_depth` hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionChain {
    hops: Vec<ChainHop>,
    max_depth: usize,
}

impl ResolutionChain {
    pub fn new(max_depth: usize) -> Self {
        Self {
            hops: Vec::with_capacity(max_depth.min(16)),
            max_depth,
        }
    }

    pub fn push(&mut self, hop: ChainHop) -> Result<(), DomainError> {
        if let Some(last) = self.hops.last() {
            if last.target != hop.owner {
                return Err(DomainError::ChainResolutionFailed(format!(
                    "hop owner {} does not continue chain ending at {}",
                    hop.owner, last.target
                )));
            }
        }

        if hop.target == hop.owner || self.contains_owner(&hop.target) {
            return Err(DomainError::CycleDetected {
                name: hop.target.to_string(),
            });
        }

        if self.hops.len() >= self.max_depth {
            return Err(DomainError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        self.hops.push(hop);
        Ok(())
    }

    pub fn contains_owner(&self, name: &str) -> bool {
        self.hops.iter().any(|h| &*h.owner == name)
    }

    pub fn hops(&self) -> &[ChainHop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Name the last hop points at; the next name to resolve.
    pub fn terminal_name(&self) -> Option<&str> {
        self.hops.last().map(|h| &*h.target)
    }

    pub fn min_hop_ttl(&self) -> Option<u32> {
        self.hops.iter().map(|h| h.ttl).min()
    }

    /// A flattened answer must not outlive any link it depends on.
    pub fn effective_ttl(&self, terminal_ttl: u32) -> u32 {
        self.min_hop_ttl()
            .map_or(terminal_ttl, |hop_ttl| hop_ttl.min(terminal_ttl))
    }

    pub fn describe(&self) -> String {
        let mut path = String::new();
        for (i, hop) in self.hops.iter().enumerate() {
            if i == 0 {
                path.push_str(&hop.owner);
            }
            path.push_str(" -> ");
            path.push_str(&hop.target);
        }
        path
    }
}
