use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use beacon_dns_application::{Provider, SnapshotSink};
use beacon_dns_domain::{DomainError, ProviderConfig, ProviderSnapshot, Record, RecordTable};
use bollard::container::ListContainersOptions;
use bollard::models::{ContainerSummary, EventMessage, EventMessageTypeEnum};
use bollard::system::EventsOptions;
use bollard::Docker;
use futures_util::StreamExt;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::registry::ProviderContext;

/// Label namespace containers opt into: `beacon-dns.enable=true` plus
/// `beacon-dns.records.<id>.{name,type,value,network}`.
pub const DISCOVERY_LABEL: &str = "beacon-dns";

const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
const DEFAULT_NETWORK: &str = "bridge";
const DEFAULT_COMPOSE_NETWORK: &str = "default";

/// Container lifecycle actions that invalidate the current snapshot.
const RESCAN_ACTIONS: &[&str] = &["start", "die", "kill", "stop", "restart"];

/// One record declared through container labels.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabeledRecord {
    pub name: String,
    pub rtype: String,
    pub value: String,
    pub network: String,
}

/// Discovers records from Docker container labels: an initial scan, then a
/// re-scan on every container lifecycle event.
pub struct DockerProvider {
    id: String,
    client: Docker,
    shutdown: CancellationToken,
}

impl DockerProvider {
    pub const KIND: &'static str = "docker";

    pub fn factory(
        ctx: &ProviderContext,
        id: &str,
        _config: &ProviderConfig,
    ) -> Result<Arc<dyn Provider>, DomainError> {
        let client = Docker::connect_with_local_defaults().map_err(|e| {
            DomainError::ProviderInit {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Arc::new(Self {
            id: id.to_string(),
            client,
            shutdown: ctx.shutdown.clone(),
        }))
    }

    async fn fetch_records(&self) -> Result<RecordTable, DomainError> {
        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            vec![format!("{DISCOVERY_LABEL}.enable=true")],
        );
        let containers = self
            .client
            .list_containers(Some(ListContainersOptions::<String> {
                filters,
                ..Default::default()
            }))
            .await
            .map_err(|e| DomainError::Io(e.to_string()))?;

        let mut records = RecordTable::new();
        for container in &containers {
            for record in container_records(container) {
                records.insert(record);
            }
        }
        Ok(records)
    }

    async fn emit(&self, outbox: &SnapshotSink, records: RecordTable) -> Result<(), DomainError> {
        outbox
            .send(ProviderSnapshot::new(self.id.clone(), records))
            .await
            .map_err(|_| DomainError::ChannelClosed)
    }

    async fn listen(&self, outbox: SnapshotSink) -> Result<(), DomainError> {
        let mut events = Box::pin(self.client.events(Some(EventsOptions::<String> {
            ..Default::default()
        })));

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                event = events.next() => {
                    let Some(event) = event else { return Ok(()) };
                    match event {
                        Err(err) => {
                            error!(provider = %self.id, %err, "error when fetch containers event");
                        }
                        Ok(event) if is_rescan_event(&event) => {
                            debug!(provider = %self.id, action = ?event.action, "container event received");
                            match self.fetch_records().await {
                                Ok(records) => self.emit(&outbox, records).await?,
                                Err(err) => {
                                    error!(provider = %self.id, %err, "error when fetch container records");
                                }
                            }
                        }
                        Ok(_) => {}
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Provider for DockerProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    async fn run(&self, outbox: SnapshotSink) -> Result<(), DomainError> {
        let records = self.fetch_records().await?;
        self.emit(&outbox, records).await?;
        self.listen(outbox).await
    }
}

fn is_rescan_event(event: &EventMessage) -> bool {
    if event.typ != Some(EventMessageTypeEnum::CONTAINER) {
        return false;
    }
    event
        .action
        .as_deref()
        .is_some_and(|action| RESCAN_ACTIONS.contains(&action))
}

/// Decodes one container's labels into records, deriving missing A values
/// from its attached networks. A container whose labels do not decode is
/// dropped whole; a record whose IP cannot be derived is dropped alone.
fn container_records(container: &ContainerSummary) -> Vec<Record> {
    let container_name = container
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(String::as_str)
        .unwrap_or("<unnamed>")
        .to_string();

    let empty = HashMap::new();
    let labels = container.labels.as_ref().unwrap_or(&empty);
    let declared = match decode_record_labels(labels) {
        Ok(declared) => declared,
        Err(err) => {
            error!(container = %container_name, %err, "failed to decode labels for docker container");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for (label_id, declared) in declared {
        let mut value = declared.value.clone();
        if value.is_empty() && declared.rtype == "A" {
            match select_container_ip(container, &declared.network) {
                Some(ip) => value = ip,
                None => {
                    error!(
                        container = %container_name,
                        label = %label_id,
                        "failed to find container ip"
                    );
                    continue;
                }
            }
        }
        records.push(Record::new(declared.name, declared.rtype, value));
    }
    records
}

/// Parses `beacon-dns.records.<id>.<field>` labels into per-id entries.
fn decode_record_labels(
    labels: &HashMap<String, String>,
) -> Result<BTreeMap<String, LabeledRecord>, DomainError> {
    let prefix = format!("{DISCOVERY_LABEL}.records.");
    let mut declared: BTreeMap<String, LabeledRecord> = BTreeMap::new();

    for (label, value) in labels {
        let Some(rest) = label.strip_prefix(prefix.as_str()) else {
            continue;
        };
        let Some((id, field)) = rest.split_once('.') else {
            return Err(DomainError::Parse(format!("malformed record label {label}")));
        };
        if id.is_empty() {
            return Err(DomainError::Parse(format!("malformed record label {label}")));
        }

        let entry = declared.entry(id.to_string()).or_default();
        match field {
            "name" => entry.name = value.clone(),
            "type" => entry.rtype = value.clone(),
            "value" => entry.value = value.clone(),
            "network" => entry.network = value.clone(),
            _ => {
                return Err(DomainError::Parse(format!(
                    "unknown field '{field}' in record label {label}"
                )))
            }
        }
    }

    Ok(declared)
}

/// Picks the container IP for a labeled A record: the first attached network
/// whose name matches the requested network, or the compose-project-scoped
/// variant of it.
fn select_container_ip(container: &ContainerSummary, requested_network: &str) -> Option<String> {
    let project = container
        .labels
        .as_ref()
        .and_then(|labels| labels.get(COMPOSE_PROJECT_LABEL))
        .map(String::as_str)
        .unwrap_or("");

    let pattern = if requested_network.is_empty() || requested_network == DEFAULT_NETWORK {
        format!(
            "^({}|{}_{})$",
            DEFAULT_NETWORK,
            regex::escape(project),
            DEFAULT_COMPOSE_NETWORK
        )
    } else {
        format!(
            "^({}|{}_{})$",
            regex::escape(requested_network),
            regex::escape(project),
            regex::escape(requested_network)
        )
    };
    let matcher = Regex::new(&pattern).ok()?;

    let networks = container.network_settings.as_ref()?.networks.as_ref()?;
    let mut names: Vec<&String> = networks.keys().collect();
    names.sort();

    for name in names {
        if !matcher.is_match(name) {
            continue;
        }
        if let Some(ip) = networks.get(name).and_then(|n| n.ip_address.clone()) {
            if !ip.is_empty() {
                return Some(ip);
            }
        }
    }
    None
}
