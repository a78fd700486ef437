mod dns;
mod web;

pub use dns::start_dns_server;
pub use web::start_web_server;
