//! Mapping between the domain record model and `hickory_proto` wire types.

use ferrous_flatten_domain::{RecordClass, RecordType};
use hickory_proto::rr::{DNSClass, RecordType as HickoryRecordType};

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Convert domain RecordType → hickory RecordType (for building queries)
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    /// Convert hickory RecordType → domain RecordType (for incoming queries)
    ///
    /// Returns `None` for unsupported record types.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> Option<RecordType> {
        RecordType::from_u16(u16::from(hickory_type))
    }

    pub fn class_to_hickory(record_class: RecordClass) -> DNSClass {
        match record_class {
            RecordClass::IN => DNSClass::IN,
            RecordClass::CH => DNSClass::CH,
            RecordClass::HS => DNSClass::HS,
        }
    }

    pub fn class_from_hickory(class: DNSClass) -> Option<RecordClass> {
        match class {
            DNSClass::IN => Some(RecordClass::IN),
            DNSClass::CH => Some(RecordClass::CH),
            DNSClass::HS => Some(RecordClass::HS),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types_map_both_ways() {
        let pairs = [
            (RecordType::A, HickoryRecordType::A),
            (RecordType::AAAA, HickoryRecordType::AAAA),
            (RecordType::CNAME, HickoryRecordType::CNAME),
            (RecordType::MX, HickoryRecordType::MX),
            (RecordType::TXT, HickoryRecordType::TXT),
            (RecordType::HTTPS, HickoryRecordType::HTTPS),
            (RecordType::ANY, HickoryRecordType::ANY),
        ];
        for (ours, theirs) in pairs {
            assert_eq!(RecordTypeMapper::to_hickory(ours), theirs);
            assert_eq!(RecordTypeMapper::from_hickory(theirs), Some(ours));
        }
    }

    #[test]
    fn test_unsupported_type_is_none() {
        assert_eq!(RecordTypeMapper::from_hickory(HickoryRecordType::OPT), None);
    }

    #[test]
    fn test_class_mapping() {
        assert_eq!(RecordTypeMapper::class_to_hickory(RecordClass::IN), DNSClass::IN);
        assert_eq!(
            RecordTypeMapper::class_from_hickory(DNSClass::CH),
            Some(RecordClass::CH)
        );
        assert_eq!(RecordTypeMapper::class_from_hickory(DNSClass::NONE), None);
    }
}
