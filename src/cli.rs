//! Command-line interface for tsuro.

use clap::{Parser, Subcommand};
use tsuro::StrategyKind;

/// Tsuro - referee-enforced tile game with a TCP client/server mode
#[derive(Parser, Debug)]
#[command(name = "tsuro")]
#[command(about = "Play Tsuro locally or over TCP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host one game for remote clients
    Server {
        /// Port to listen on (overrides the config file)
        port: Option<u16>,

        /// Address to bind (overrides the config file)
        ip: Option<String>,

        /// Path to a TOML server config
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Join a game hosted by `tsuro server`
    Client {
        /// Server port
        #[arg(default_value = "8000")]
        port: u16,

        /// Server address
        #[arg(default_value = "127.0.0.1")]
        ip: String,

        /// Player name
        #[arg(default_value = "player")]
        name: String,

        /// Strategy to play with
        #[arg(value_enum, default_value_t = StrategyKind::Dumb)]
        strategy: StrategyKind,
    },

    /// Play a local game; reads a JSON array of 3 to 5 names on stdin
    Run,

    /// Check one turn for legality; reads a JSON array of moves on stdin
    Check,
}
