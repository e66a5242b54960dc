use super::{RecordClass, RecordType};
use std::fmt;
use std::sync::Arc;

/// A question as issued to the pipeline. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub record_class: RecordClass,
}

impl DnsQuery {
    pub fn new(domain: impl AsRef<str>, record_type: RecordType) -> Self {
        Self::with_class(domain, record_type, RecordClass::IN)
    }

    pub fn with_class(
        domain: impl AsRef<str>,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Self {
        Self {
            domain: normalize_name(domain.as_ref()).into(),
            record_type,
            record_class,
        }
    }

    /// Same type and class, different owner name. Used to follow an alias hop.
    pub fn for_target(&self, target: &str) -> Self {
        Self::with_class(target, self.record_type, self.record_class)
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.domain, self.record_class, self.record_type)
    }
}

/// Lowercase, fully-qualified form used for every name comparison in a chain.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." {
        return ".".to_string();
    }
    let mut normalized = trimmed.to_ascii_lowercase();
    if !normalized.ends_with('.') {
        normalized.push('.');
    }
    normalized
}
