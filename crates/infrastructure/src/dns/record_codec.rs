use std::str::FromStr;

use beacon_dns_domain::{to_fqdn, Record};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, NS, SOA, TXT};
use hickory_proto::rr::{Name, RData, Record as WireRecord};
use tracing::debug;

/// TTL stamped on every authoritative answer.
pub const RECORD_TTL: u32 = 3600;

/// Renders a record into a wire RR (class IN, fixed TTL). Records whose
/// value does not parse for their type yield `None` and are skipped by the
/// answer assembly.
pub fn record_to_rr(record: &Record) -> Option<WireRecord> {
    let name = Name::from_str(&to_fqdn(&record.name)).ok()?;

    let rdata = match record.rtype.as_str() {
        "A" => RData::A(A(record.value.parse().ok()?)),
        "AAAA" => RData::AAAA(AAAA(record.value.parse().ok()?)),
        "CNAME" => RData::CNAME(CNAME(parse_name(&record.value)?)),
        "NS" => RData::NS(NS(parse_name(&record.value)?)),
        "TXT" => RData::TXT(TXT::new(vec![record.value.clone()])),
        "SOA" => RData::SOA(parse_soa(&record.value)?),
        other => {
            debug!(name = %record.name, rtype = %other, "record type has no wire rendering");
            return None;
        }
    };

    Some(WireRecord::from_rdata(name, RECORD_TTL, rdata))
}

/// Maps an upstream answer RR back into the textual record model so local
/// and delegated answers assemble the same way.
pub fn rr_to_record(rr: &WireRecord) -> Option<Record> {
    let name = rr.name().to_utf8();
    let name = name.trim_end_matches('.');

    let (rtype, value) = match rr.data() {
        RData::A(a) => ("A", a.0.to_string()),
        RData::AAAA(aaaa) => ("AAAA", aaaa.0.to_string()),
        RData::CNAME(cname) => ("CNAME", cname.0.to_utf8()),
        RData::NS(ns) => ("NS", ns.0.to_utf8()),
        RData::TXT(txt) => (
            "TXT",
            txt.txt_data()
                .iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect::<Vec<_>>()
                .join(""),
        ),
        RData::SOA(soa) => (
            "SOA",
            format!(
                "{} {} {} {} {} {} {}",
                soa.mname(),
                soa.rname(),
                soa.serial(),
                soa.refresh(),
                soa.retry(),
                soa.expire(),
                soa.minimum()
            ),
        ),
        _ => return None,
    };

    Some(Record::new(name, rtype, value))
}

fn parse_name(value: &str) -> Option<Name> {
    Name::from_str(&to_fqdn(value)).ok()
}

/// Master-file SOA RDATA: mname rname serial refresh retry expire minimum.
fn parse_soa(value: &str) -> Option<SOA> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() != 7 {
        return None;
    }
    Some(SOA::new(
        parse_name(fields[0])?,
        parse_name(fields[1])?,
        fields[2].parse().ok()?,
        fields[3].parse().ok()?,
        fields[4].parse().ok()?,
        fields[5].parse().ok()?,
        fields[6].parse().ok()?,
    ))
}
