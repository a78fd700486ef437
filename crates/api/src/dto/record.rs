use beacon_dns_domain::Record;
use serde::Deserialize;

/// Body of `POST /records` and `DELETE /records`.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
}

impl RecordBody {
    pub fn into_record(self) -> Record {
        Record::new(self.name, self.record_type, self.value)
    }
}

/// Body of the ACME DNS-01 `present`/`cleanup` endpoints.
#[derive(Debug, Deserialize)]
pub struct AcmeChallengeBody {
    pub fqdn: String,
    pub value: String,
}
