//! TCP game server: a join phase followed by one game.

use crate::config::ServerConfig;
use crate::players::{Player, RemotePlayer};
use crate::protocol::{ClientMessage, Connection, ServerMessage};
use crate::referee::{MAX_PLAYERS, Referee};
use crate::results::GameResults;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A client that completed the join handshake.
struct Joined {
    name: String,
    connection: Connection<TcpStream>,
}

/// Hosts a single game for remote clients.
#[derive(Debug, Clone)]
pub struct GameServer {
    config: ServerConfig,
}

impl GameServer {
    /// Creates a server with the given settings.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Binds the configured address and runs one game.
    pub async fn run(&self) -> anyhow::Result<GameResults> {
        let listener = TcpListener::bind(self.config.address()).await?;
        info!(address = %listener.local_addr()?, "Listening");
        self.serve(listener).await
    }

    /// Accepts players on `listener`, then plays the game.
    ///
    /// The roster closes after [`MAX_PLAYERS`] connections, or once no new
    /// connection arrives within the join timeout.
    #[instrument(skip_all)]
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<GameResults> {
        let players = self.gather_players(&listener).await;
        drop(listener);
        info!(players = players.len(), "Roster closed");

        let mut referee = Referee::new(players).await?;
        while referee.run_turn().await? {}

        info!(eliminated = referee.results().len(), "Game finished");
        Ok(referee.results().clone())
    }

    async fn gather_players(&self, listener: &TcpListener) -> Vec<Box<dyn Player>> {
        let (join_tx, mut join_rx) = mpsc::unbounded_channel::<Joined>();
        let mut accepted = 0usize;

        while accepted < MAX_PLAYERS {
            match tokio::time::timeout(self.config.join_timeout(), listener.accept()).await {
                Ok(Ok((stream, address))) => {
                    accepted += 1;
                    info!(%address, accepted, "Connection accepted");
                    let connection = Connection::new(
                        stream,
                        *self.config.max_message_bytes(),
                        address.to_string(),
                    );
                    let join_tx = join_tx.clone();
                    let deadline = self.config.handshake_timeout();
                    tokio::spawn(async move {
                        if let Some(joined) = handshake(connection, deadline).await {
                            // The receiver outlives every handshake task.
                            let _ = join_tx.send(joined);
                        }
                    });
                }
                Ok(Err(e)) => warn!(error = %e, "Accept failed"),
                Err(_) => {
                    info!(
                        timeout_secs = self.config.join_timeout_secs(),
                        "No new connections, closing the roster"
                    );
                    break;
                }
            }
        }
        drop(join_tx);

        let mut players: Vec<Box<dyn Player>> = Vec::new();
        while let Some(joined) = join_rx.recv().await {
            let age = players.len() as u32;
            players.push(Box::new(RemotePlayer::new(
                joined.name,
                age,
                joined.connection,
                self.config.move_timeout(),
            )));
        }
        players
    }
}

/// Asks a fresh connection who it is. Anything but `JOIN` gets it ejected.
async fn handshake(
    mut connection: Connection<TcpStream>,
    deadline: std::time::Duration,
) -> Option<Joined> {
    if let Err(e) = connection.send(&ServerMessage::AskForPlayerInfo).await {
        warn!(peer = connection.peer(), error = %e, "Handshake failed");
        return None;
    }

    let reply = tokio::time::timeout(deadline, connection.receive::<ClientMessage>()).await;
    let reason = match reply {
        Ok(Ok(Some(ClientMessage::Join { name, strategy }))) => {
            debug!(peer = connection.peer(), %name, %strategy, "Client joined");
            return Some(Joined { name, connection });
        }
        Ok(Ok(Some(other))) => format!("Expected JOIN, got {other:?}"),
        Ok(Ok(None)) => {
            debug!(peer = connection.peer(), "Client left during handshake");
            return None;
        }
        Ok(Err(e)) => e.message,
        Err(_) => "Did not join in time".to_string(),
    };

    warn!(peer = connection.peer(), %reason, "Rejecting client");
    let _ = connection.send(&ServerMessage::Ejected { reason }).await;
    None
}
