use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use studio_orchestrator::gateway::Orchestrator;
use studio_orchestrator::models::Config;
use studio_orchestrator::server::{self, AppState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "studio-orchestrator")]
#[command(about = "Serve the AI orchestration API")]
struct CliArgs {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3001")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_orchestrator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    info!("Starting studio-orchestrator");

    let config = Config::from_env().context("failed to load configuration")?;
    let orchestrator =
        Orchestrator::from_config(&config).context("failed to initialize orchestrator")?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        Arc::new(orchestrator),
        config.request_timeout,
        shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    server::serve(listener, state).await?;
    info!("Server stopped");
    Ok(())
}
