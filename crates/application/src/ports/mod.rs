mod provider;
mod upstream;

pub use provider::{Provider, SnapshotSink};
pub use upstream::UpstreamClient;
