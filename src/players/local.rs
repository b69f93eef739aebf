//! In-process player driven by a strategy.

use super::{Player, PlayerState, PlayerSummary};
use crate::results::GameResults;
use crate::strategy::{Strategy, Turn};
use tracing::{debug, info, instrument, warn};
use tsuro_core::{Board, Color, Placement, Tile, Token};

/// A player whose moves come from a [`Strategy`].
pub struct LocalPlayer {
    name: String,
    age: u32,
    color: Option<Color>,
    token: Option<Token>,
    state: PlayerState,
    strategy: Box<dyn Strategy>,
    results: Option<GameResults>,
}

impl LocalPlayer {
    /// Creates a player.
    pub fn new(name: impl Into<String>, age: u32, strategy: Box<dyn Strategy>) -> Self {
        Self {
            name: name.into(),
            age,
            color: None,
            token: None,
            state: PlayerState::Alive,
            strategy,
            results: None,
        }
    }

    /// Assigned color, once received.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Token as of the last game state.
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// State as of the last game state.
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Final results, once the game has ended.
    pub fn results(&self) -> Option<&GameResults> {
        self.results.as_ref()
    }
}

impl std::fmt::Debug for LocalPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPlayer")
            .field("name", &self.name)
            .field("age", &self.age)
            .field("color", &self.color)
            .field("token", &self.token)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Player for LocalPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn age(&self) -> u32 {
        self.age
    }

    async fn receive_color(&mut self, color: Color) {
        match self.color {
            Some(existing) => {
                warn!(player = %self.name, %existing, offered = %color, "Color already assigned");
            }
            None => {
                debug!(player = %self.name, %color, "Color assigned");
                self.color = Some(color);
            }
        }
    }

    async fn receive_tiles(&mut self, tiles: &[Tile]) {
        let indices: Vec<usize> = tiles.iter().map(Tile::index).collect();
        debug!(player = %self.name, ?indices, "Received tiles");
    }

    async fn receive_gamestate(&mut self, _: &Board, me: &PlayerSummary, _: &[PlayerSummary]) {
        self.token = me.token;
        self.state = me.state;
    }

    #[instrument(skip_all, fields(player = %self.name))]
    async fn next_move(&mut self, board: &Board, hand: &[Tile]) -> Option<Placement> {
        let Some(color) = self.color else {
            warn!("Asked for a move before receiving a color");
            return None;
        };
        let mut hand = hand.to_vec();
        let placement = self.strategy.next_move(Turn {
            board,
            color,
            token: self.token,
            hand: &mut hand,
        });
        debug!(?placement, "Strategy chose");
        placement
    }

    async fn receive_move_success(&mut self) {
        debug!(player = %self.name, "Move accepted");
    }

    async fn receive_move_failure(&mut self, reason: &str) {
        warn!(player = %self.name, reason, "Move rejected");
        self.state = PlayerState::Ejected;
    }

    async fn receive_game_end(&mut self, results: &GameResults) {
        info!(player = %self.name, eliminated = results.len(), "Game over");
        self.results = Some(results.clone());
    }
}
