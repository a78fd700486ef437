pub mod aggregator;
pub mod ports;
pub mod use_cases;

pub use aggregator::{RecordAggregator, SharedRecords, SNAPSHOT_MAILBOX_CAPACITY};
pub use ports::{Provider, SnapshotSink, UpstreamClient};
pub use use_cases::HandleDnsQueryUseCase;
