use serde::{Deserialize, Serialize};

/// One discovery source: a kind tag resolved through the factory registry
/// plus a free-form table the factory decodes into its own config.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub config: toml::Table,
}

impl ProviderConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            config: toml::Table::new(),
        }
    }
}
