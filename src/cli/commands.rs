//! CLI command definitions

use clap::{Parser, Subcommand};
use rtctoken::config::{ISSUER_ID_ENV, ISSUER_SECRET_ENV};

#[derive(Parser)]
#[command(name = "rtctoken")]
#[command(about = "Issue and inspect signed channel access tokens", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Issuer identity
    #[arg(long, env = ISSUER_ID_ENV, global = true)]
    pub issuer_id: Option<String>,

    /// Issuer signing secret
    #[arg(long, env = ISSUER_SECRET_ENV, global = true, hide_env_values = true)]
    pub issuer_secret: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a token
    ///
    /// Examples:
    ///   rtctoken issue --channel room1 --uid 42
    ///   rtctoken issue --channel room1 --uid alice --role publisher --ttl 600
    Issue {
        /// Channel the token grants access to
        #[arg(short, long)]
        channel: String,

        /// User id (numeric or account name)
        #[arg(short, long)]
        uid: String,

        /// Role: publisher or subscriber
        #[arg(short, long, default_value = "subscriber", value_parser = parse_role)]
        role: String,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        ttl: u64,
    },

    /// Verify a token and print its contents
    Inspect {
        /// Token string
        token: String,
    },
}

fn parse_role(s: &str) -> Result<String, String> {
    match rtctoken::Role::parse(s) {
        Some(role) => Ok(role.to_string()),
        None => Err(format!("Invalid role: {}. Must be publisher or subscriber", s)),
    }
}
