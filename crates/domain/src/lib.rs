pub mod config;
pub mod errors;
pub mod record;
pub mod snapshot;

pub use config::{
    CliOverrides, Config, ConfigError, FallbackConfig, HttpConfig, LoggingConfig, ProviderConfig,
};
pub use errors::DomainError;
pub use record::{format_record_key, to_fqdn, Record, RecordTable, RecordType};
pub use snapshot::ProviderSnapshot;
