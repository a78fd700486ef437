mod record_type;
mod table;

pub use record_type::RecordType;
pub use table::RecordTable;

use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

/// A fully-resolved DNS record in master-file textual form.
///
/// `rtype` stays a free string so providers can carry record types beyond the
/// canonical set understood by [`RecordType`]. Records are immutable once
/// built; equality is structural on all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub value: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        rtype: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rtype: rtype.into(),
            value: value.into(),
        }
    }

    /// Canonical lookup key for this record.
    pub fn key(&self) -> String {
        format_record_key(&self.name, &self.rtype)
    }

    /// A record with any empty field cannot be resolved or keyed.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() || self.rtype.is_empty() || self.value.is_empty() {
            return Err(DomainError::InvalidRecord(format!(
                "{} {} {}",
                self.name, self.rtype, self.value
            )));
        }
        Ok(())
    }
}

/// Appends the trailing dot iff absent.
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Canonical lookup key: `FQDN(name) + "_" + type`.
///
/// The name half is lowercased so lookups are case-insensitive per RFC 1035;
/// record names themselves keep their original case.
pub fn format_record_key(name: &str, rtype: &str) -> String {
    format!("{}_{}", to_fqdn(&name.to_ascii_lowercase()), rtype)
}
