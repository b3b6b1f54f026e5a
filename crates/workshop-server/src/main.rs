use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use workshop_server::server::config::{CliArgs, ServerConfig};
use workshop_server::server::telemetry::init_telemetry;
use workshop_server::server::{Services, run, shutdown_signal};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let grpc = TcpListener::bind(config.grpc_addr).await?;
    let rest = match config.rest_addr {
        Some(addr) => Some(TcpListener::bind(addr).await?),
        None => None,
    };
    log_startup_info(&config);

    let services = Services::from_config(&config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let result = run(services, grpc, rest, shutdown).await;
    match &result {
        Ok(()) => tracing::info!("Service shut down successfully"),
        Err(err) => tracing::error!("Service stopped: {err:#}"),
    }

    providers.shutdown();
    result
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting workshop with full config: {config:#?}");
    } else {
        tracing::info!(
            role = ?config.role,
            grpc = %config.grpc_addr,
            rest = ?config.rest_addr,
            "Starting workshop"
        );
    }
}
