use serde::{Deserialize, Serialize};

/// Optional HTTP façade: read-only record listing, plus the push-API
/// provider's mutation endpoints when `enable_provider` is set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub enable: bool,

    #[serde(default)]
    pub listen: String,

    #[serde(default)]
    pub enable_provider: bool,
}
