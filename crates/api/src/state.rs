use std::sync::Arc;

use beacon_dns_application::SharedRecords;
use beacon_dns_infrastructure::providers::ApiProvider;

#[derive(Clone)]
pub struct AppState {
    /// Read handle to the aggregator's merged table.
    pub records: SharedRecords,

    /// Present only when the push-API provider is enabled; gates the
    /// mutation routes.
    pub provider: Option<Arc<ApiProvider>>,
}
