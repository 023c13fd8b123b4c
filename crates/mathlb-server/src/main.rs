use anyhow::Context;
use clap::Parser;
use mathlb_server::server::{
    config::{CliArgs, ServerConfig},
    pool::dial::connect_workers,
    serve::serve_with_incoming,
    telemetry::init_telemetry,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;

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

    let pool = connect_workers(&config.workers, config.connect_timeout).await;

    let tcp = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to listen on {}", config.listen_addr))?;
    let incoming = TcpListenerStream::new(tcp);
    log_startup_info(&config, pool.len());

    if let Err(e) = serve_with_incoming(pool, incoming, shutdown_signal()).await {
        tracing::error!("Failed to serve: {e:#}");
    } else {
        tracing::info!("Proxy shut down successfully");
    }

    providers.shutdown();
    Ok(())
}

fn log_startup_info(config: &ServerConfig, pool_size: usize) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting proxy on {} with full config: {:#?}",
            config.listen_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting proxy on {} with {} of {} workers",
            config.listen_addr,
            pool_size,
            config.workers.len()
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
