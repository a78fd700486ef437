use async_trait::async_trait;
use beacon_dns_domain::{DomainError, Record};

/// One exchange with one upstream recursive resolver.
///
/// Implementations append `:53` when the address carries no port and bound
/// the exchange with the configured per-attempt timeout.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn exchange(
        &self,
        nameserver: &str,
        name: &str,
        qtype: u16,
    ) -> Result<Vec<Record>, DomainError>;
}
