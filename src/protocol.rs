//! Wire protocol: newline-delimited JSON messages.
//!
//! Every message is one JSON object on one line, tagged by a `type` field.
//! Raw traffic is logged at debug level under the `tsuro::wire` target.

use crate::players::{PlayerState, PlayerSummary};
use crate::results::GameResults;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf,
};
use tracing::debug;
use tsuro_core::{BoardSnapshot, Color, PlacementMessage, Port, TileSnapshot};

/// Messages from the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// First message on a new connection; answered with `JOIN`.
    AskForPlayerInfo,
    /// The client's color for this game.
    ReceiveColor {
        /// Assigned color.
        color: Color,
    },
    /// Board and players before a turn.
    ReceiveGameState {
        /// The board.
        board: BoardSnapshot,
        /// Every player, in turn order.
        players: Vec<PlayerSummary>,
        /// The receiving player's state.
        state: PlayerState,
        /// The tile under the receiving player's token.
        tile: Option<TileSnapshot>,
        /// The port the receiving player's token sits at.
        port: Option<Port>,
    },
    /// The client must answer with `MOVE_REQUEST`.
    AskForMove {
        /// The board.
        board: BoardSnapshot,
        /// The hand dealt for this turn.
        tiles: Vec<TileSnapshot>,
    },
    /// The last move was committed.
    MoveAccepted,
    /// The client is out of the game.
    Ejected {
        /// Why.
        reason: String,
    },
    /// The game is over.
    GameEnd {
        /// Eliminations by round.
        results: GameResults,
    },
}

/// Messages from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Answer to `ASK_FOR_PLAYER_INFO`.
    Join {
        /// Player name.
        name: String,
        /// Strategy the client plays with, informational.
        strategy: String,
    },
    /// Answer to `ASK_FOR_MOVE`.
    MoveRequest(PlacementMessage),
}

/// Wire protocol error.
#[derive(Debug, Clone, Display, Error)]
#[display("Protocol error: {} at {}:{}", message, file, line)]
pub struct ProtocolError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ProtocolError {
    /// Creates a new protocol error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// A framed, logged JSON connection over any byte stream.
pub struct Connection<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    max_message_bytes: usize,
    peer: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    /// Wraps `stream`. Lines longer than `max_message_bytes` are rejected.
    pub fn new(stream: S, max_message_bytes: usize, peer: impl Into<String>) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(reader),
            writer,
            max_message_bytes,
            peer: peer.into(),
        }
    }

    /// Label used in logs.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Relabels the connection, e.g. with the player's color once known.
    pub fn set_peer(&mut self, peer: impl Into<String>) {
        self.peer = peer.into();
    }

    /// Sends one message as a single line.
    pub async fn send<M: Serialize>(&mut self, message: &M) -> Result<(), ProtocolError> {
        let mut line = serde_json::to_string(message)
            .map_err(|e| ProtocolError::new(format!("Failed to encode message: {}", e)))?;
        debug!(target: "tsuro::wire", peer = %self.peer, ">> {}", line);
        line.push('\n');

        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ProtocolError::new(format!("Failed to write to {}: {}", self.peer, e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ProtocolError::new(format!("Failed to flush {}: {}", self.peer, e)))
    }

    /// Receives one message, or `None` once the peer has closed the stream.
    pub async fn receive<M: DeserializeOwned>(&mut self) -> Result<Option<M>, ProtocolError> {
        let limit = self.max_message_bytes as u64 + 1;
        let mut line = String::new();
        let read = (&mut self.reader)
            .take(limit)
            .read_line(&mut line)
            .await
            .map_err(|e| ProtocolError::new(format!("Failed to read from {}: {}", self.peer, e)))?;

        if read == 0 {
            debug!(target: "tsuro::wire", peer = %self.peer, "<< closed");
            return Ok(None);
        }

        let content = line.trim_end_matches(['\r', '\n']);
        if !line.ends_with('\n') && line.len() > self.max_message_bytes {
            return Err(ProtocolError::new(format!(
                "Message from {} exceeds {} bytes",
                self.peer, self.max_message_bytes
            )));
        }
        debug!(target: "tsuro::wire", peer = %self.peer, "<< {}", content);

        serde_json::from_str(content)
            .map(Some)
            .map_err(|e| ProtocolError::new(format!("Invalid message from {}: {}", self.peer, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tsuro_core::PlacementType;

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_value(ServerMessage::AskForPlayerInfo).unwrap();
        assert_eq!(json, json!({"type": "ASK_FOR_PLAYER_INFO"}));

        let json = serde_json::to_value(ServerMessage::Ejected {
            reason: "space occupied".to_string(),
        })
        .unwrap();
        assert_eq!(json, json!({"type": "EJECTED", "reason": "space occupied"}));
    }

    #[test]
    fn test_move_request_is_flat() {
        let message: ClientMessage = serde_json::from_value(json!({
            "type": "MOVE_REQUEST",
            "placement_type": "INTERMEDIATE",
            "index": 4,
            "rotation": 90,
            "color": "black",
            "x": 3,
            "y": 2
        }))
        .unwrap();
        let ClientMessage::MoveRequest(placement) = message else {
            panic!("expected a move request");
        };
        assert_eq!(placement.placement_type, PlacementType::Intermediate);
        assert_eq!(placement.port, None);
    }

    #[tokio::test]
    async fn test_lines_round_trip_over_duplex() {
        let (a, b) = tokio::io::duplex(1024);
        let mut server = Connection::new(a, 512, "server");
        let mut client = Connection::new(b, 512, "client");

        server.send(&ServerMessage::MoveAccepted).await.unwrap();
        let received: Option<ServerMessage> = client.receive().await.unwrap();
        assert_eq!(received, Some(ServerMessage::MoveAccepted));

        drop(server);
        let closed: Option<ServerMessage> = client.receive().await.unwrap();
        assert_eq!(closed, None);
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected() {
        let (a, b) = tokio::io::duplex(4096);
        let mut writer = Connection::new(a, 4096, "writer");
        let mut reader = Connection::new(b, 32, "reader");

        writer
            .send(&ServerMessage::Ejected {
                reason: "x".repeat(100),
            })
            .await
            .unwrap();
        let err = reader.receive::<ServerMessage>().await.unwrap_err();
        assert!(err.message.contains("exceeds 32 bytes"), "{err}");
    }

    #[tokio::test]
    async fn test_garbage_is_a_protocol_error() {
        let (mut a, b) = tokio::io::duplex(1024);
        let mut reader = Connection::new(b, 1024, "reader");
        a.write_all(b"{not json}\n").await.unwrap();
        assert!(reader.receive::<ClientMessage>().await.is_err());
    }
}
