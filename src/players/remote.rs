//! Proxy for a player on the other end of a connection.

use super::{Player, PlayerSummary};
use crate::protocol::{ClientMessage, Connection, ServerMessage};
use crate::results::GameResults;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, instrument, warn};
use tsuro_core::{Board, Color, Placement, Tile};

/// Forwards every callback to a client and waits, with a deadline, for its
/// moves.
///
/// Any failure to talk to the client (closed stream, garbage, timeout, wrong
/// message) turns into a forfeited move. After the stream closes or a write
/// fails, the proxy stops talking to the client.
pub struct RemotePlayer<S> {
    name: String,
    age: u32,
    color: Option<Color>,
    connection: Connection<S>,
    move_timeout: Duration,
    connected: bool,
}

impl<S> RemotePlayer<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    /// Wraps a connection that has completed the join handshake.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        connection: Connection<S>,
        move_timeout: Duration,
    ) -> Self {
        let name = name.into();
        info!(player = %name, age, peer = connection.peer(), "Remote player joined");
        Self {
            name,
            age,
            color: None,
            connection,
            move_timeout,
            connected: true,
        }
    }

    /// Whether the proxy still talks to its client.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&mut self, message: &ServerMessage) {
        if !self.connected {
            return;
        }
        if let Err(e) = self.connection.send(message).await {
            warn!(player = %self.name, error = %e, "Lost connection");
            self.connected = false;
        }
    }

    async fn await_move(&mut self) -> Option<Placement> {
        let request = self.connection.receive::<ClientMessage>();
        let reply = tokio::time::timeout(self.move_timeout, request).await;
        match reply {
            Ok(Ok(Some(ClientMessage::MoveRequest(message)))) => {
                match Placement::try_from(message) {
                    Ok(placement) => Some(placement),
                    Err(e) => {
                        warn!(player = %self.name, error = %e, "Malformed placement");
                        None
                    }
                }
            }
            Ok(Ok(Some(other))) => {
                warn!(player = %self.name, message = ?other, "Expected MOVE_REQUEST");
                None
            }
            Ok(Ok(None)) => {
                warn!(player = %self.name, "Client closed the connection");
                self.connected = false;
                None
            }
            Ok(Err(e)) => {
                warn!(player = %self.name, error = %e, "Bad reply to ASK_FOR_MOVE");
                None
            }
            Err(_) => {
                warn!(
                    player = %self.name,
                    timeout_secs = self.move_timeout.as_secs(),
                    "Move timed out"
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<S> Player for RemotePlayer<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn age(&self) -> u32 {
        self.age
    }

    async fn receive_color(&mut self, color: Color) {
        if self.color.is_some() {
            warn!(player = %self.name, %color, "Color already assigned");
            return;
        }
        self.color = Some(color);
        self.connection.set_peer(format!("{} ({color})", self.name));
        self.send(&ServerMessage::ReceiveColor { color }).await;
    }

    async fn receive_tiles(&mut self, tiles: &[Tile]) {
        debug!(player = %self.name, count = tiles.len(), "Hand dealt");
    }

    async fn receive_gamestate(
        &mut self,
        board: &Board,
        me: &PlayerSummary,
        players: &[PlayerSummary],
    ) {
        let token = me.token;
        let message = ServerMessage::ReceiveGameState {
            board: board.snapshot(),
            players: players.to_vec(),
            state: me.state,
            tile: token
                .and_then(|t| board.tile(t.position()))
                .map(Tile::snapshot),
            port: token.map(|t| t.port()),
        };
        self.send(&message).await;
    }

    #[instrument(skip_all, fields(player = %self.name))]
    async fn next_move(&mut self, board: &Board, hand: &[Tile]) -> Option<Placement> {
        self.send(&ServerMessage::AskForMove {
            board: board.snapshot(),
            tiles: hand.iter().map(Tile::snapshot).collect(),
        })
        .await;
        if !self.connected {
            return None;
        }
        self.await_move().await
    }

    async fn receive_move_success(&mut self) {
        self.send(&ServerMessage::MoveAccepted).await;
    }

    async fn receive_move_failure(&mut self, reason: &str) {
        self.send(&ServerMessage::Ejected {
            reason: reason.to_string(),
        })
        .await;
    }

    async fn receive_game_end(&mut self, results: &GameResults) {
        self.send(&ServerMessage::GameEnd {
            results: results.clone(),
        })
        .await;
    }
}
