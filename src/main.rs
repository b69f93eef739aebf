//! Tsuro - unified CLI
//!
//! Hosts a TCP game, joins one as a client, or drives games from stdin.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use tsuro::{GameServer, ServerConfig, StrategyKind};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the JSON answers.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Server { port, ip, config } => run_server(port, ip, config).await,
        Command::Client {
            port,
            ip,
            name,
            strategy,
        } => run_client(port, ip, name, strategy).await,
        Command::Run => run_batch_game().await,
        Command::Check => run_check(),
    }
}

#[instrument]
async fn run_server(port: Option<u16>, ip: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("loading server config from {}", path.display()))?,
        None => ServerConfig::default(),
    }
    .with_address(ip, port);

    info!(address = %config.address(), "Starting Tsuro server");
    let results = GameServer::new(config).run().await?;
    println!("{}", serde_json::to_string(&results.outcome())?);
    Ok(())
}

#[instrument]
async fn run_client(port: u16, ip: String, name: String, strategy: StrategyKind) -> Result<()> {
    let address = format!("{ip}:{port}");
    let max_message_bytes = *ServerConfig::default().max_message_bytes();
    let outcome = tsuro::connect(&address, &name, strategy, max_message_bytes).await?;
    info!(?outcome, "Client finished");
    Ok(())
}

async fn run_batch_game() -> Result<()> {
    let input = read_stdin()?;
    let names: Vec<String> =
        serde_json::from_str(&input).context("expected a JSON array of player names")?;
    let outcome = tsuro::run_game(&names).await?;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

fn run_check() -> Result<()> {
    let input = read_stdin()?;
    let instructions: Vec<serde_json::Value> =
        serde_json::from_str(&input).context("expected a JSON array of moves")?;
    let verdict = if tsuro::check_turn(&instructions)? {
        "legal"
    } else {
        "illegal"
    };
    println!("{}", serde_json::to_string(verdict)?);
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading stdin")?;
    Ok(input)
}
