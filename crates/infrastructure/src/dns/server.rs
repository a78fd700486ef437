use std::sync::Arc;

use beacon_dns_application::HandleDnsQueryUseCase;
use hickory_proto::op::OpCode;
use hickory_proto::rr::{Name, Record as WireRecord};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use tracing::{debug, error};

use super::record_codec::record_to_rr;

/// Stateless DNS request handler: answers QUERY questions from the merged
/// record table (with fallback), everything else with an empty reply.
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }
}

#[async_trait::async_trait]
impl RequestHandler for DnsServerHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let request_info = match request.request_info() {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "failed to parse request info");
                return send_reply(request, &mut response_handle, &[]).await;
            }
        };

        let query = &request_info.query;
        let qname = Name::from(query.name()).to_utf8();
        let qtype = u16::from(query.query_type());

        debug!(
            name = %qname,
            qtype = %query.query_type(),
            client = %request.src().ip(),
            "DNS question received"
        );

        // Only QUERY resolves; other opcodes get the empty templated reply.
        let answers: Vec<WireRecord> = if request.header().op_code() == OpCode::Query {
            self.use_case
                .execute(&qname, qtype)
                .await
                .iter()
                .filter_map(record_to_rr)
                .collect()
        } else {
            Vec::new()
        };

        send_reply(request, &mut response_handle, &answers).await
    }
}

/// Replies with the request's own header; no error RCODE is set on empty
/// answer sets.
async fn send_reply<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    answers: &[WireRecord],
) -> ResponseInfo {
    let builder = MessageResponseBuilder::from_message_request(request);
    let mut header = *request.header();
    header.set_recursion_available(true);
    let response = builder.build(header, answers.iter(), &[], &[], &[]);

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "failed to send DNS response");
            ResponseInfo::from(*request.header())
        }
    }
}
