use std::sync::Arc;

use async_trait::async_trait;
use beacon_dns_application::{Provider, SnapshotSink};
use beacon_dns_domain::{DomainError, ProviderConfig, ProviderSnapshot, Record, RecordTable};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::registry::ProviderContext;

/// A mutation's result travels back once the run loop has handed the new
/// snapshot to the aggregator mailbox.
struct SnapshotSignal {
    records: RecordTable,
    ack: oneshot::Sender<()>,
}

/// Push-API provider: an in-memory record table mutated by HTTP handlers.
///
/// Every mutation snapshots the table, wakes the run loop, and blocks until
/// the loop has delivered the snapshot to the aggregator. That rendezvous is
/// deliberate: an HTTP 2xx means the aggregator has the new records, which
/// is what ACME DNS-01 clients rely on before polling.
pub struct ApiProvider {
    id: String,
    records: Mutex<RecordTable>,
    signal_tx: mpsc::Sender<SnapshotSignal>,
    signal_rx: Mutex<Option<mpsc::Receiver<SnapshotSignal>>>,
    shutdown: CancellationToken,
}

impl ApiProvider {
    pub const KIND: &'static str = "api";

    pub fn new(id: impl Into<String>, shutdown: CancellationToken) -> Self {
        let (signal_tx, signal_rx) = mpsc::channel(1);
        Self {
            id: id.into(),
            records: Mutex::new(RecordTable::new()),
            signal_tx,
            signal_rx: Mutex::new(Some(signal_rx)),
            shutdown,
        }
    }

    pub fn factory(
        ctx: &ProviderContext,
        id: &str,
        _config: &ProviderConfig,
    ) -> Result<Arc<dyn Provider>, DomainError> {
        Ok(Arc::new(Self::new(id, ctx.shutdown.clone())))
    }

    /// Appends the record to its key's bucket.
    pub async fn add_record(&self, record: Record) -> Result<(), DomainError> {
        record.validate()?;
        let snapshot = {
            let mut records = self.records.lock().await;
            records.insert(record);
            records.clone()
        };
        self.publish(snapshot).await
    }

    /// Removes every entry under the record's key whose value matches;
    /// an emptied bucket disappears entirely.
    pub async fn delete_record(&self, record: Record) -> Result<(), DomainError> {
        record.validate()?;
        let key = record.key();
        let snapshot = {
            let mut records = self.records.lock().await;
            if let Some(bucket) = records.bucket_mut(&key) {
                bucket.retain(|existing| existing.value != record.value);
                if bucket.is_empty() {
                    records.remove_bucket(&key);
                }
            }
            records.clone()
        };
        self.publish(snapshot).await
    }

    /// ACME DNS-01 challenge interface: publish a TXT record.
    pub async fn present(&self, fqdn: String, value: String) -> Result<(), DomainError> {
        self.add_record(Record::new(fqdn, "TXT", value)).await
    }

    /// ACME DNS-01 challenge interface: withdraw a TXT record.
    pub async fn cleanup(&self, fqdn: String, value: String) -> Result<(), DomainError> {
        self.delete_record(Record::new(fqdn, "TXT", value)).await
    }

    async fn publish(&self, records: RecordTable) -> Result<(), DomainError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.signal_tx
            .send(SnapshotSignal {
                records,
                ack: ack_tx,
            })
            .await
            .map_err(|_| DomainError::ChannelClosed)?;
        ack_rx.await.map_err(|_| DomainError::ChannelClosed)
    }
}

#[async_trait]
impl Provider for ApiProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    async fn run(&self, outbox: SnapshotSink) -> Result<(), DomainError> {
        let mut signals =
            self.signal_rx
                .lock()
                .await
                .take()
                .ok_or_else(|| DomainError::ProviderInit {
                    id: self.id.clone(),
                    reason: "run started twice".to_string(),
                })?;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                signal = signals.recv() => {
                    let Some(SnapshotSignal { records, ack }) = signal else {
                        return Ok(());
                    };
                    debug!(provider = %self.id, keys = records.len(), "pushing record snapshot");
                    outbox
                        .send(ProviderSnapshot::new(self.id.clone(), records))
                        .await
                        .map_err(|_| DomainError::ChannelClosed)?;
                    let _ = ack.send(());
                }
            }
        }
    }
}
