use serde::{Deserialize, Serialize};

/// Delegation of lookup misses to upstream recursive resolvers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub enable: bool,

    #[serde(default)]
    pub nameservers: Vec<String>,

    /// Per-attempt exchange timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enable: false,
            nameservers: Vec::new(),
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    4
}
