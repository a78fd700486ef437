use async_trait::async_trait;
use beacon_dns_domain::{DomainError, ProviderSnapshot};
use tokio::sync::mpsc;

/// Where providers hand their snapshots to the aggregator. The mailbox is
/// bounded; sends block when the merge loop falls behind.
pub type SnapshotSink = mpsc::Sender<ProviderSnapshot>;

/// A discovery source.
///
/// `run` is the provider's whole lifetime: it emits zero or more full
/// snapshots on `outbox` and returns when the engine shuts down. A returned
/// error stops only this provider; its peers keep running.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique within the process.
    fn id(&self) -> &str;

    /// Kind tag, e.g. `fs`, `docker`, `api`.
    fn kind(&self) -> &'static str;

    async fn run(&self, outbox: SnapshotSink) -> Result<(), DomainError>;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish()
    }
}
