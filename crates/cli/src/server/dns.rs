use beacon_dns_infrastructure::dns::DnsServerHandler;
use hickory_server::ServerFuture;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Binds the UDP listener and serves until shutdown. A bind failure is
/// returned to the caller and ends the process.
pub async fn start_dns_server(
    bind_addr: &str,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket = UdpSocket::bind(bind_addr).await?;
    info!(bind_address = %bind_addr, "DNS server listening (udp)");

    let mut server = ServerFuture::new(handler);
    server.register_socket(socket);

    tokio::select! {
        result = server.block_until_done() => result?,
        _ = shutdown.cancelled() => {}
    }

    if shutdown.is_cancelled() {
        info!("draining in-flight DNS requests");
        server.shutdown_gracefully().await?;
    }

    Ok(())
}
