//! Player trait and implementations.

mod local;
mod remote;

pub use local::LocalPlayer;
pub use remote::RemotePlayer;

use crate::results::GameResults;
use serde::{Deserialize, Serialize};
use tsuro_core::{Board, Color, Placement, Tile, Token};

/// Where a player stands in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerState {
    /// Still playing.
    #[default]
    #[display("is alive")]
    Alive,
    /// Walked off the board.
    #[display("died")]
    Dead,
    /// Walked off the board at another player's starting point.
    #[display("collided")]
    Collided,
    /// Removed for an invalid or missing move.
    #[display("was ejected")]
    Ejected,
}

impl PlayerState {
    /// Whether the player still takes turns.
    pub fn is_active(self) -> bool {
        self == PlayerState::Alive
    }
}

/// Public view of one player, as broadcast to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Display name.
    pub name: String,
    /// Assigned color.
    pub color: Color,
    /// Token on the board, once the player has placed a tile.
    pub token: Option<Token>,
    /// Lifecycle state.
    pub state: PlayerState,
}

/// A participant in a game, as seen by the referee.
///
/// Local players answer from a strategy; remote players forward every call
/// over the wire protocol. The referee treats both the same way.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Display name.
    fn name(&self) -> &str;

    /// Age; younger players move first.
    fn age(&self) -> u32;

    /// Receives the player's color. Called once per game.
    async fn receive_color(&mut self, color: Color);

    /// Receives the hand dealt for the coming turn.
    async fn receive_tiles(&mut self, tiles: &[Tile]);

    /// Receives the board and every player's state before each turn.
    async fn receive_gamestate(
        &mut self,
        board: &Board,
        me: &PlayerSummary,
        players: &[PlayerSummary],
    );

    /// Chooses a move, or `None` to forfeit.
    async fn next_move(&mut self, board: &Board, hand: &[Tile]) -> Option<Placement>;

    /// The last move was committed.
    async fn receive_move_success(&mut self);

    /// The last move was rejected and the player is out.
    async fn receive_move_failure(&mut self, reason: &str);

    /// The game is over.
    async fn receive_game_end(&mut self, results: &GameResults);
}
