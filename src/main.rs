//! rtctoken CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use clap::Parser;
use rtctoken::auth::Role;
use rtctoken::{IssuerConfig, TokenBuilder, TokenVerifier, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so the token on stdout stays pipeable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let issuer = IssuerConfig::new(
        cli.issuer_id.unwrap_or_default(),
        cli.issuer_secret.unwrap_or_default(),
    )
    .context("RTCTOKEN_ISSUER_ID and RTCTOKEN_ISSUER_SECRET (or --issuer-id/--issuer-secret) are required")?;

    match cli.command {
        Commands::Issue {
            channel,
            uid,
            role,
            ttl,
        } => issue(issuer, channel, uid, role, ttl),
        Commands::Inspect { token } => inspect(issuer, token),
    }
}

fn issue(issuer: IssuerConfig, channel: String, uid: String, role: String, ttl: u64) -> Result<()> {
    let role = Role::parse(&role).ok_or_else(|| anyhow::anyhow!("Invalid role: {}", role))?;

    let builder = TokenBuilder::new(issuer);
    let expires_at = builder.now().saturating_add(ttl);
    let token = builder
        .build_token(&channel, &UserId::from(uid), role, expires_at)
        .context("Failed to build token")?;

    println!("{}", token);
    Ok(())
}

fn inspect(issuer: IssuerConfig, token: String) -> Result<()> {
    let verifier = TokenVerifier::new(issuer);
    let payload = verifier.verify(token.trim()).context("Token rejected")?;

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
