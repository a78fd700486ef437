use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("provider type '{kind}' for {id} does not exist")]
    UnknownProviderType { kind: String, id: String },

    #[error("failed to create provider {id}: {reason}")]
    ProviderInit { id: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("record not valid: {0}")]
    InvalidRecord(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("upstream {server} failed: {reason}")]
    Upstream { server: String, reason: String },

    #[error("query timeout from {server}")]
    QueryTimeout { server: String },

    #[error("snapshot channel closed")]
    ChannelClosed,
}
