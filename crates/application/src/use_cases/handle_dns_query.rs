use std::sync::Arc;

use beacon_dns_domain::{format_record_key, FallbackConfig, Record, RecordType};
use tracing::{debug, error};

use crate::aggregator::SharedRecords;
use crate::ports::UpstreamClient;

/// Resolves one DNS question against the merged record table, with optional
/// delegation to upstream recursive resolvers on a miss.
///
/// Stateless: everything it reads lives in the aggregator's published table.
pub struct HandleDnsQueryUseCase {
    records: SharedRecords,
    fallback: FallbackConfig,
    upstream: Arc<dyn UpstreamClient>,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        records: SharedRecords,
        fallback: FallbackConfig,
        upstream: Arc<dyn UpstreamClient>,
    ) -> Self {
        Self {
            records,
            fallback,
            upstream,
        }
    }

    /// `name` is the question name in FQDN form (trailing dot), `qtype` the
    /// wire type code.
    pub async fn execute(&self, name: &str, qtype: u16) -> Vec<Record> {
        let table = self.records.load();
        let answers = find_records(&table, name, qtype);
        if !answers.is_empty() {
            return answers;
        }

        if self.fallback.enable {
            for nameserver in &self.fallback.nameservers {
                match self.upstream.exchange(nameserver, name, qtype).await {
                    Ok(answers) => return answers,
                    Err(err) => {
                        debug!(nameserver = %nameserver, %err, "fallback exchange failed")
                    }
                }
            }
        }

        Vec::new()
    }
}

/// Pure lookup over one table snapshot.
///
/// Step ordering is material: exact match, then NS wildcard ascent, then
/// CNAME indirection for A questions, then A wildcard ascent.
pub fn find_records(table: &beacon_dns_domain::RecordTable, name: &str, qtype: u16) -> Vec<Record> {
    let key = format_record_key(name, RecordType::name_for_code(qtype));
    if let Some(bucket) = table.get(&key) {
        return bucket.to_vec();
    }

    if qtype == RecordType::NS.code() && name != "*." {
        let mut found = find_records(table, &wildcard_parent(name), qtype);
        let owner = name.trim_end_matches('.');
        for record in &mut found {
            record.name = owner.to_string();
        }
        return found;
    }

    if qtype == RecordType::A.code() {
        let cname_key = format_record_key(name, RecordType::CNAME.as_str());
        if let Some(bucket) = table.get(&cname_key) {
            if bucket.is_empty() {
                error!(name = %name, "no DNS records for name type CNAME");
                return Vec::new();
            }
            let cname = bucket[0].clone();
            let mut chased = find_records(table, &cname.value, qtype);
            let mut answers = Vec::with_capacity(chased.len() + 1);
            answers.push(cname);
            answers.append(&mut chased);
            return answers;
        }

        if name != "*." {
            let found = find_records(table, &wildcard_parent(name), qtype);
            let owner = name.trim_end_matches('.');
            return found
                .into_iter()
                .enumerate()
                .map(|(index, record)| {
                    // Only the head of a wildcard chain takes the question's
                    // name; chased records keep their own owner.
                    let name = if index == 0 {
                        owner.to_string()
                    } else {
                        record.name
                    };
                    Record::new(name, record.rtype, record.value)
                })
                .collect();
        }
    }

    Vec::new()
}

/// `a.b.c.` → `*.b.c.`; a leading wildcard label is consumed along with the
/// label after it, so `*.b.c.` → `*.c.`.
fn wildcard_parent(name: &str) -> String {
    let labels: Vec<&str> = name.split('.').collect();
    let skip = if labels.first() == Some(&"*") { 2 } else { 1 };
    let rest = labels.get(skip..).unwrap_or(&[]);
    format!("*.{}", rest.join("."))
}
