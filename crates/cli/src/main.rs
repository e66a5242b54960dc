use clap::Parser;
use ferrous_flatten_domain::CliOverrides;
use ferrous_flatten_infrastructure::dns::DnsServer;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "ferrous-flatten")]
#[command(version = "0.1.0")]
#[command(about = "Ferrous Flatten - DNS forwarder that flattens CNAME chains")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Maximum number of CNAME hops followed per query
    #[arg(long)]
    max_depth: Option<usize>,

    /// Flattening directive, e.g. "max_depth 8 8.8.8.8 1.1.1.1"
    #[arg(long, value_name = "DIRECTIVE")]
    directive: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
        max_depth: cli.max_depth,
        directive: cli.directive.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous Flatten v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    let services = di::FlattenServices::new(&config, &shutdown)?;

    let bind_ip: IpAddr = config.server.bind_address.parse()?;
    let dns_addr = SocketAddr::new(bind_ip, config.server.dns_port);
    let dns_server = Arc::new(DnsServer::new(
        services.handler.clone(),
        Duration::from_millis(config.server.request_timeout),
        shutdown.clone(),
    ));

    let outcome = tokio::select! {
        result = server::start_dns_server(dns_addr, dns_server) => result,
        signal = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            signal.map_err(anyhow::Error::from)
        }
    };

    shutdown.cancel();
    services.shutdown().await;

    info!("Server shutdown complete");
    outcome
}
