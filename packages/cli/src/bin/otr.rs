use std::net::IpAddr;
use std::process;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;

use otr_api::ApiConfig;
use otr_cli::LinkAdmin;

mod cli;

#[derive(Parser)]
#[command(name = "otr")]
#[command(about = "One-time registration links: serve the gate and manage tokens")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Overrides OTR_API_PORT
        #[arg(long)]
        port: Option<u16>,
        /// Overrides OTR_API_HOST
        #[arg(long)]
        host: Option<IpAddr>,
    },
    /// Issue new registration links and print their URLs
    Issue {
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },
    /// List outstanding registration links
    List {
        /// Show full URLs instead of token prefixes
        #[arg(long)]
        urls: bool,
    },
    /// Check whether a token is still valid without consuming it
    Check { token: String },
    /// Add an existing token, e.g. one handed out before a migration
    Import {
        token: String,
        /// RFC 3339 issue time; defaults to now
        #[arg(long)]
        issued_at: Option<DateTime<Utc>>,
    },
    /// Delete tokens older than the given number of days
    Purge {
        #[arg(long)]
        older_than_days: u32,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    otr_cli::init_tracing();

    let cli = Cli::parse();

    match handle_command(cli.command).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Returns `false` when the command ran but the answer was negative (`check`)
async fn handle_command(command: Commands) -> anyhow::Result<bool> {
    let mut config = ApiConfig::from_env().context("Failed to load configuration")?;

    match command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            otr_cli::run_server(config).await?;
        }
        Commands::Issue { count } => {
            cli::links::issue_links(&open_admin(&config).await?, count).await?
        }
        Commands::List { urls } => cli::links::list_links(&open_admin(&config).await?, urls).await?,
        Commands::Check { token } => {
            return Ok(cli::links::check_token(&open_admin(&config).await?, &token).await?)
        }
        Commands::Import { token, issued_at } => {
            cli::links::import_token(&open_admin(&config).await?, &token, issued_at).await?
        }
        Commands::Purge { older_than_days } => {
            cli::links::purge_links(&open_admin(&config).await?, older_than_days).await?
        }
    }

    Ok(true)
}

async fn open_admin(config: &ApiConfig) -> anyhow::Result<LinkAdmin> {
    LinkAdmin::open(config)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))
}
