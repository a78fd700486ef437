use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use beacon_dns_application::use_cases::find_records;
use beacon_dns_application::{HandleDnsQueryUseCase, SharedRecords, UpstreamClient};
use beacon_dns_domain::{DomainError, FallbackConfig, Record, RecordTable, RecordType};

fn table(records: &[(&str, &str, &str)]) -> RecordTable {
    records
        .iter()
        .map(|(name, rtype, value)| Record::new(*name, *rtype, *value))
        .collect()
}

const A: u16 = 1;
const NS: u16 = 2;

#[test]
fn exact_a_match_returns_the_bucket_verbatim() {
    let table = table(&[("foo.local", "A", "127.0.0.1")]);

    let answers = find_records(&table, "foo.local.", A);

    assert_eq!(answers, vec![Record::new("foo.local", "A", "127.0.0.1")]);
}

#[test]
fn exact_match_is_case_insensitive() {
    let table = table(&[("foo.local", "A", "127.0.0.1")]);

    let answers = find_records(&table, "FOO.Local.", A);

    assert_eq!(answers.len(), 1);
}

#[test]
fn cname_chase_returns_cname_then_target() {
    let table = table(&[
        ("foo.local", "A", "127.0.0.1"),
        ("bar.foo.local", "CNAME", "foo.local."),
    ]);

    let answers = find_records(&table, "bar.foo.local.", A);

    assert_eq!(
        answers,
        vec![
            Record::new("bar.foo.local", "CNAME", "foo.local."),
            Record::new("foo.local", "A", "127.0.0.1"),
        ]
    );
}

#[test]
fn wildcard_a_matches_across_two_labels() {
    let table = table(&[("*.foo.local", "A", "127.0.0.3")]);

    let answers = find_records(&table, "wildcard.second.foo.local.", A);

    assert_eq!(
        answers,
        vec![Record::new("wildcard.second.foo.local", "A", "127.0.0.3")]
    );
}

#[test]
fn wildcard_cname_chain_resolves_through_two_wildcards() {
    let mut merged = RecordTable::new();
    merged.insert(Record::new("foo.local", "A", "127.0.0.1"));
    // Buckets are looked up by key; the stored names only matter to the
    // rewrite logic.
    merged.insert_under(
        "*.other.local._CNAME",
        Record::new("*.foo.local", "CNAME", "foo.local."),
    );
    merged.insert_under(
        "*.foo.other.local._CNAME",
        Record::new("*.foo.local", "CNAME", "wildcard.other.local."),
    );

    let answers = find_records(&merged, "wildcard.foo.other.local.", A);

    assert_eq!(
        answers,
        vec![
            Record::new("wildcard.foo.other.local", "CNAME", "wildcard.other.local."),
            Record::new("wildcard.other.local", "CNAME", "foo.local."),
            Record::new("foo.local", "A", "127.0.0.1"),
        ]
    );
}

#[test]
fn ns_wildcard_rewrites_the_owner_name() {
    let table = table(&[("*.local", "NS", "ns.local")]);

    let answers = find_records(&table, "ns.bar.local.", NS);

    assert_eq!(answers, vec![Record::new("ns.bar.local", "NS", "ns.local")]);
}

#[test]
fn empty_cname_bucket_yields_no_answers() {
    let mut merged = RecordTable::new();
    merged.insert(Record::new("dangling.local", "CNAME", "gone.local."));
    merged
        .bucket_mut("dangling.local._CNAME")
        .unwrap()
        .clear();

    let answers = find_records(&merged, "dangling.local.", A);

    assert!(answers.is_empty());
}

#[test]
fn unknown_qtype_never_matches_a_records() {
    let table = table(&[("foo.local", "A", "127.0.0.1")]);

    // MX (15) is outside the supported set and must not alias to A.
    assert!(find_records(&table, "foo.local.", 15).is_empty());
    assert_eq!(RecordType::name_for_code(15), "UNKNOWN");
}

#[test]
fn miss_returns_empty() {
    let table = table(&[("foo.local", "A", "127.0.0.1")]);

    assert!(find_records(&table, "absent.local.", A).is_empty());
    assert!(find_records(&table, "foo.local.", NS).is_empty());
}

/// Scripted upstream: answers per nameserver, recording the order attempted.
struct ScriptedUpstream {
    outcomes: Vec<(&'static str, Result<Vec<Record>, DomainError>)>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    fn new(outcomes: Vec<(&'static str, Result<Vec<Record>, DomainError>)>) -> Arc<Self> {
        Arc::new(Self {
            outcomes,
            attempts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn exchange(
        &self,
        nameserver: &str,
        _name: &str,
        _qtype: u16,
    ) -> Result<Vec<Record>, DomainError> {
        self.attempts.lock().unwrap().push(nameserver.to_string());
        for (server, outcome) in &self.outcomes {
            if *server == nameserver {
                return outcome.clone();
            }
        }
        Err(DomainError::Upstream {
            server: nameserver.to_string(),
            reason: "unscripted".to_string(),
        })
    }
}

fn fallback(nameservers: &[&str]) -> FallbackConfig {
    FallbackConfig {
        enable: true,
        nameservers: nameservers.iter().map(|s| s.to_string()).collect(),
        timeout: 4,
    }
}

#[tokio::test]
async fn fallback_tries_upstreams_in_order_until_one_answers() {
    let upstream = ScriptedUpstream::new(vec![
        (
            "1.1.1.1",
            Err(DomainError::QueryTimeout {
                server: "1.1.1.1:53".to_string(),
            }),
        ),
        (
            "2.2.2.2",
            Ok(vec![Record::new("example.com", "A", "127.0.0.1")]),
        ),
    ]);

    let use_case = HandleDnsQueryUseCase::new(
        SharedRecords::from_table(RecordTable::new()),
        fallback(&["1.1.1.1", "2.2.2.2"]),
        upstream.clone(),
    );

    let answers = use_case.execute("example.com.", A).await;

    assert_eq!(answers, vec![Record::new("example.com", "A", "127.0.0.1")]);
    assert_eq!(
        *upstream.attempts.lock().unwrap(),
        vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()]
    );
}

#[tokio::test]
async fn local_answers_skip_fallback_entirely() {
    let upstream = ScriptedUpstream::new(vec![(
        "1.1.1.1",
        Ok(vec![Record::new("foo.local", "A", "9.9.9.9")]),
    )]);

    let use_case = HandleDnsQueryUseCase::new(
        SharedRecords::from_table(table(&[("foo.local", "A", "127.0.0.1")])),
        fallback(&["1.1.1.1"]),
        upstream.clone(),
    );

    let answers = use_case.execute("foo.local.", A).await;

    assert_eq!(answers, vec![Record::new("foo.local", "A", "127.0.0.1")]);
    assert!(upstream.attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fallback_enabled_with_no_nameservers_returns_empty() {
    let upstream = ScriptedUpstream::new(Vec::new());
    let use_case = HandleDnsQueryUseCase::new(
        SharedRecords::from_table(RecordTable::new()),
        fallback(&[]),
        upstream.clone(),
    );

    let answers = use_case.execute("example.com.", A).await;

    assert!(answers.is_empty());
    assert!(upstream.attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn all_upstreams_failing_returns_empty() {
    let upstream = ScriptedUpstream::new(Vec::new());
    let use_case = HandleDnsQueryUseCase::new(
        SharedRecords::from_table(RecordTable::new()),
        fallback(&["1.1.1.1", "2.2.2.2"]),
        upstream.clone(),
    );

    let answers = use_case.execute("example.com.", A).await;

    assert!(answers.is_empty());
    assert_eq!(upstream.attempts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn fallback_disabled_never_contacts_upstreams() {
    let upstream = ScriptedUpstream::new(vec![(
        "1.1.1.1",
        Ok(vec![Record::new("example.com", "A", "127.0.0.1")]),
    )]);

    let use_case = HandleDnsQueryUseCase::new(
        SharedRecords::from_table(RecordTable::new()),
        FallbackConfig::default(),
        upstream.clone(),
    );

    let answers = use_case.execute("example.com.", A).await;

    assert!(answers.is_empty());
    assert!(upstream.attempts.lock().unwrap().is_empty());
}
