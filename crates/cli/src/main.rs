use std::sync::Arc;
use std::time::Duration;

use beacon_dns_api::AppState;
use beacon_dns_application::{HandleDnsQueryUseCase, RecordAggregator};
use beacon_dns_domain::CliOverrides;
use beacon_dns_infrastructure::dns::{DnsServerHandler, UdpForwarder};
use beacon_dns_infrastructure::providers::{ApiProvider, ProviderContext, ProviderRegistry};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "beacon-dns")]
#[command(version)]
#[command(about = "DNS server that discovers its records from providers")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// UDP bind address for the DNS server
    #[arg(long)]
    listen: Option<String>,

    /// Bind address for the HTTP server
    #[arg(long)]
    http_listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        listen_addr: cli.listen,
        http_listen: cli.http_listen,
        log_level: cli.log_level,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    info!("starting beacon-dns v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    let ctx = ProviderContext {
        shutdown: shutdown.clone(),
    };

    // Provider construction failures are fatal; a misconfigured discovery
    // source should never come up half-blind.
    let registry = ProviderRegistry::with_defaults();
    let mut providers = registry.create_all(&ctx, &config.providers)?;

    let mut api_provider: Option<Arc<ApiProvider>> = None;
    if config.http.enable && config.http.enable_provider {
        let provider = Arc::new(ApiProvider::new("api", shutdown.clone()));
        providers.insert("api".to_string(), provider.clone());
        api_provider = Some(provider);
    }

    let aggregator = RecordAggregator::new(providers.into_values().collect(), shutdown.clone());
    let records = aggregator.records();
    aggregator.start();

    let forwarder = Arc::new(UdpForwarder::new(Duration::from_secs(
        config.fallback.timeout,
    )));
    let use_case = Arc::new(HandleDnsQueryUseCase::new(
        records.clone(),
        config.fallback.clone(),
        forwarder,
    ));

    if config.http.enable {
        let state = AppState {
            records,
            provider: api_provider,
        };
        let listen = config.http.listen.clone();
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = server::start_web_server(&listen, state, token).await {
                error!(%err, "HTTP server error");
            }
        });
    }

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("signal received, exiting...");
        signal_token.cancel();
    });

    let handler = DnsServerHandler::new(use_case);
    server::start_dns_server(&config.listen_addr, handler, shutdown).await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
