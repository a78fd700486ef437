use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use beacon_dns_domain::{ProviderSnapshot, RecordTable};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Snapshot mailbox depth. Providers block on send when the merge loop
/// falls this far behind.
pub const SNAPSHOT_MAILBOX_CAPACITY: usize = 40;

/// Read handle to the published merged table.
///
/// Loads return an immutable snapshot; the merge loop replaces the table by
/// pointer swap, so readers never lock and never observe a torn state.
#[derive(Clone)]
pub struct SharedRecords {
    inner: Arc<ArcSwap<RecordTable>>,
}

impl SharedRecords {
    fn empty() -> Self {
        Self::from_table(RecordTable::new())
    }

    /// A handle pre-seeded with a fixed table; handy where no aggregator is
    /// running (tests, tools).
    pub fn from_table(table: RecordTable) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    pub fn load(&self) -> Arc<RecordTable> {
        self.inner.load_full()
    }

    fn store(&self, table: RecordTable) {
        self.inner.store(Arc::new(table));
    }
}

/// Owns the per-provider snapshot cache and publishes the merged view.
///
/// One merge loop consumes the mailbox serially; each provider runs in its
/// own task. The set of provider slots is fixed at startup and entries are
/// never removed.
pub struct RecordAggregator {
    providers: Vec<Arc<dyn crate::ports::Provider>>,
    records: SharedRecords,
    shutdown: CancellationToken,
}

impl RecordAggregator {
    pub fn new(
        providers: Vec<Arc<dyn crate::ports::Provider>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            providers,
            records: SharedRecords::empty(),
            shutdown,
        }
    }

    pub fn records(&self) -> SharedRecords {
        self.records.clone()
    }

    /// Launches the merge loop and every provider's `run`.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_MAILBOX_CAPACITY);

        let cache: BTreeMap<String, RecordTable> = self
            .providers
            .iter()
            .map(|provider| (provider.id().to_string(), RecordTable::new()))
            .collect();

        let mut handles = Vec::with_capacity(self.providers.len() + 1);
        handles.push(tokio::spawn(merge_loop(
            rx,
            cache,
            self.records.clone(),
            self.shutdown.clone(),
        )));

        for provider in &self.providers {
            let provider = provider.clone();
            let outbox = tx.clone();
            handles.push(tokio::spawn(async move {
                if let Err(err) = provider.run(outbox).await {
                    error!(provider = %provider.id(), kind = %provider.kind(), %err, "error when provide");
                }
            }));
        }

        handles
    }
}

async fn merge_loop(
    mut mailbox: mpsc::Receiver<ProviderSnapshot>,
    mut cache: BTreeMap<String, RecordTable>,
    records: SharedRecords,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                mailbox.close();
                return;
            }
            message = mailbox.recv() => {
                let Some(snapshot) = message else { return };
                apply_snapshot(&mut cache, &records, snapshot);
            }
        }
    }
}

fn apply_snapshot(
    cache: &mut BTreeMap<String, RecordTable>,
    records: &SharedRecords,
    snapshot: ProviderSnapshot,
) {
    if !cache.contains_key(&snapshot.provider_id) {
        error!("routine received a message that does not belong to any provider");
        return;
    }

    debug!(
        provider = %snapshot.provider_id,
        keys = snapshot.records.len(),
        "record snapshot received"
    );
    cache.insert(snapshot.provider_id.clone(), snapshot.records);

    // Fixed BTreeMap order keeps the intra-bucket record order stable for a
    // given set of snapshots.
    let mut merged = RecordTable::new();
    for table in cache.values() {
        merged.append_merge(table.clone());
    }
    records.store(merged);
}
