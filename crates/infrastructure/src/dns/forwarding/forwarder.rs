use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use beacon_dns_application::UpstreamClient;
use beacon_dns_domain::{DomainError, Record};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable, BinEncoder};
use tokio::net::UdpSocket;

use crate::dns::record_codec::rr_to_record;

/// One-shot UDP exchange with an upstream recursive resolver.
pub struct UdpForwarder {
    timeout: Duration,
}

impl UdpForwarder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl UpstreamClient for UdpForwarder {
    async fn exchange(
        &self,
        nameserver: &str,
        name: &str,
        qtype: u16,
    ) -> Result<Vec<Record>, DomainError> {
        let server = ensure_port(nameserver);
        let (id, request) = build_query(name, qtype)?;

        let upstream_err = |reason: String| DomainError::Upstream {
            server: server.clone(),
            reason,
        };

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| upstream_err(format!("failed to bind socket: {e}")))?;
        socket
            .connect(&server)
            .await
            .map_err(|e| upstream_err(format!("failed to connect: {e}")))?;
        socket
            .send(&request)
            .await
            .map_err(|e| upstream_err(format!("failed to send query: {e}")))?;

        let mut buf = vec![0u8; 4096];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| DomainError::QueryTimeout {
                server: server.clone(),
            })?
            .map_err(|e| upstream_err(format!("failed to receive response: {e}")))?;

        let response = Message::from_bytes(&buf[..len])
            .map_err(|e| upstream_err(format!("failed to parse response: {e}")))?;
        if response.id() != id {
            return Err(upstream_err("response id mismatch".to_string()));
        }

        Ok(response.answers().iter().filter_map(rr_to_record).collect())
    }
}

/// Bare addresses default to the DNS port.
fn ensure_port(nameserver: &str) -> String {
    if nameserver.contains(':') {
        nameserver.to_string()
    } else {
        format!("{nameserver}:53")
    }
}

fn build_query(name: &str, qtype: u16) -> Result<(u16, Vec<u8>), DomainError> {
    let name = Name::from_str(name)
        .map_err(|e| DomainError::Parse(format!("invalid question name '{name}': {e}")))?;

    let mut query = Query::new();
    query.set_name(name);
    query.set_query_type(RecordType::from(qtype));
    query.set_query_class(DNSClass::IN);

    let id = fastrand::u16(..);
    let mut message = Message::new();
    message.set_id(id);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| DomainError::Parse(format!("failed to serialize query: {e}")))?;

    Ok((id, buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_addresses_get_the_dns_port() {
        assert_eq!(ensure_port("1.1.1.1"), "1.1.1.1:53");
        assert_eq!(ensure_port("1.1.1.1:5353"), "1.1.1.1:5353");
    }

    #[test]
    fn queries_carry_the_recursion_desired_flag() {
        let (id, bytes) = build_query("example.com.", 1).unwrap();
        let message = Message::from_bytes(&bytes).unwrap();

        assert_eq!(message.id(), id);
        assert!(message.recursion_desired());
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::A);
    }
}
