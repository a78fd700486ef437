pub mod forwarding;
pub mod record_codec;
pub mod server;

pub use forwarding::UdpForwarder;
pub use server::DnsServerHandler;
