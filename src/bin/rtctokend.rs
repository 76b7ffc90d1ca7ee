//! rtctoken daemon - HTTP token service

use anyhow::{Context, Result};
use clap::Parser;
use rtctoken::config::{DEFAULT_TTL_SECS, ISSUER_ID_ENV, ISSUER_SECRET_ENV, MAX_TTL_SECS};
use rtctoken::{IssuerConfig, ServerConfig, TokenServer};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rtctokend")]
#[command(about = "HTTP service issuing signed channel access tokens")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:3000", env = "RTCTOKEN_BIND")]
    bind: String,

    /// Issuer identity
    #[arg(long, env = ISSUER_ID_ENV)]
    issuer_id: String,

    /// Issuer signing secret
    #[arg(long, env = ISSUER_SECRET_ENV, hide_env_values = true)]
    issuer_secret: String,

    /// Token lifetime when the request does not specify one
    #[arg(long, env = "RTCTOKEN_DEFAULT_TTL", default_value_t = DEFAULT_TTL_SECS)]
    default_ttl: u64,

    /// Longest token lifetime a request may ask for
    #[arg(long, env = "RTCTOKEN_MAX_TTL", default_value_t = MAX_TTL_SECS)]
    max_ttl: u64,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    run_server(args).await
}

async fn run_server(args: Args) -> Result<()> {
    // Missing issuer configuration aborts startup
    let issuer = IssuerConfig::new(args.issuer_id, args.issuer_secret)
        .context("Issuer is not configured")?;

    let bind_addr = args.bind.parse().context("Invalid bind address")?;

    let config = ServerConfig::new(bind_addr, issuer)
        .default_ttl(args.default_ttl)
        .max_ttl(args.max_ttl);

    let server = TokenServer::new(config);

    info!(addr = %args.bind, "rtctoken daemon starting");

    server.run_until(shutdown_signal()).await?;

    info!("rtctoken daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}
