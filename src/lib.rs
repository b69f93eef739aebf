//! Tsuro - referee-enforced games for local and remote players
//!
//! Rules, tiles and the board live in [`tsuro_core`]. This crate adds the
//! parts that run a game.
//!
//! # Architecture
//!
//! - **Referee**: deals tiles, validates moves, tracks eliminations
//! - **Players**: one async trait, served by local strategies or TCP proxies
//! - **Protocol**: newline-delimited JSON between server and clients
//! - **Batch**: whole games and single rule checks driven from JSON input
//!
//! # Example
//!
//! ```no_run
//! use tsuro::{LocalPlayer, Player, Referee, StrategyKind};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let players: Vec<Box<dyn Player>> = ["ann", "bo", "cy"]
//!     .into_iter()
//!     .zip(0..)
//!     .map(|(name, age)| {
//!         Box::new(LocalPlayer::new(name, age, StrategyKind::Dumb.build())) as Box<dyn Player>
//!     })
//!     .collect();
//!
//! let mut referee = Referee::new(players).await?;
//! while referee.run_turn().await? {}
//! println!("{:?}", referee.results().outcome());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod batch;
mod client;
mod config;
mod players;
mod protocol;
mod referee;
mod results;
mod server;
mod strategy;

// Crate-level exports - Batch drivers
pub use batch::{Replay, check_turn, run_game};

// Crate-level exports - Client
pub use client::{ClientError, ClientOutcome, connect, play};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Players
pub use players::{LocalPlayer, Player, PlayerState, PlayerSummary, RemotePlayer};

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, Connection, ProtocolError, ServerMessage};

// Crate-level exports - Referee
pub use referee::{MAX_PLAYERS, MIN_PLAYERS, MoveRejection, Phase, Referee};

// Crate-level exports - Results
pub use results::{Elimination, GameOutcome, GameResults};

// Crate-level exports - Server
pub use server::GameServer;

// Crate-level exports - Strategies
pub use strategy::{
    Dumb, Predetermined, Second, Strategy, StrategyKind, Turn, perimeter_clockwise,
    perimeter_counter_clockwise,
};
