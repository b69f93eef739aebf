//! Game client: plays a local strategy against a remote server.

use crate::players::{LocalPlayer, Player, PlayerSummary};
use crate::protocol::{ClientMessage, Connection, ProtocolError, ServerMessage};
use crate::results::GameResults;
use crate::strategy::StrategyKind;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};
use tsuro_core::{Board, Tile, Token, TsuroError};

/// How a client's game ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientOutcome {
    /// The server sent the results.
    Finished(GameResults),
    /// The server ejected the client.
    Ejected(String),
    /// The server closed the connection without a result.
    Disconnected,
}

/// Client failure.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ClientError {
    /// Connection or message failure.
    #[display("{_0}")]
    Protocol(ProtocolError),
    /// The server sent a board or tile that could not be rebuilt.
    #[display("{_0}")]
    Game(TsuroError),
    /// The strategy had no move to offer.
    #[display("No move available")]
    #[from(skip)]
    NoMove,
}

/// Connects over TCP and plays until the game ends.
#[instrument(skip(strategy), fields(strategy = %strategy))]
pub async fn connect(
    address: &str,
    name: &str,
    strategy: StrategyKind,
    max_message_bytes: usize,
) -> anyhow::Result<ClientOutcome> {
    let stream = TcpStream::connect(address).await?;
    info!(address, "Connected");
    let connection = Connection::new(stream, max_message_bytes, address);
    Ok(play(connection, name, strategy).await?)
}

/// Answers server messages with a [`LocalPlayer`] until the game ends.
#[instrument(skip(connection, strategy), fields(peer = connection.peer()))]
pub async fn play<S>(
    mut connection: Connection<S>,
    name: &str,
    strategy: StrategyKind,
) -> Result<ClientOutcome, ClientError>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    let mut player = LocalPlayer::new(name, 0, strategy.build());

    while let Some(message) = connection.receive::<ServerMessage>().await? {
        match message {
            ServerMessage::AskForPlayerInfo => {
                connection
                    .send(&ClientMessage::Join {
                        name: name.to_string(),
                        strategy: strategy.to_string(),
                    })
                    .await?;
            }
            ServerMessage::ReceiveColor { color } => player.receive_color(color).await,
            ServerMessage::ReceiveGameState {
                board,
                players,
                state,
                tile,
                port,
            } => {
                let board = Board::from_snapshot(&board)?;
                let Some(color) = player.color() else {
                    warn!("Game state before color assignment");
                    continue;
                };
                let position = tile
                    .as_ref()
                    .map(Tile::from_snapshot)
                    .transpose()?
                    .and_then(|tile| tile.position());
                let me = PlayerSummary {
                    name: name.to_string(),
                    color,
                    token: position.zip(port).map(|(position, port)| Token::new(position, port)),
                    state,
                };
                player.receive_gamestate(&board, &me, &players).await;
            }
            ServerMessage::AskForMove { board, tiles } => {
                let board = Board::from_snapshot(&board)?;
                let hand = tiles
                    .iter()
                    .map(Tile::from_snapshot)
                    .collect::<Result<Vec<_>, _>>()?;
                player.receive_tiles(&hand).await;
                let placement = player.next_move(&board, &hand).await.ok_or(ClientError::NoMove)?;
                debug!(%placement, "Submitting move");
                connection.send(&ClientMessage::MoveRequest(placement.into())).await?;
            }
            ServerMessage::MoveAccepted => player.receive_move_success().await,
            ServerMessage::Ejected { reason } => {
                player.receive_move_failure(&reason).await;
                return Ok(ClientOutcome::Ejected(reason));
            }
            ServerMessage::GameEnd { results } => {
                player.receive_game_end(&results).await;
                return Ok(ClientOutcome::Finished(results));
            }
        }
    }

    info!("Server closed the connection");
    Ok(ClientOutcome::Disconnected)
}
