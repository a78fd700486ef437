mod errors;
mod fallback;
mod http;
mod logging;
mod provider;
mod root;

pub use errors::ConfigError;
pub use fallback::FallbackConfig;
pub use http::HttpConfig;
pub use logging::LoggingConfig;
pub use provider::ProviderConfig;
pub use root::{CliOverrides, Config};
