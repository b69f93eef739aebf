//! Turn sequencing, move validation, and elimination.

use crate::players::{Player, PlayerState, PlayerSummary};
use crate::results::{Elimination, GameResults};
use std::collections::HashSet;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};
use tsuro_core::{
    Board, Color, PathEnd, Placement, PlacementKind, PlayerContext, Rotation, RuleSet,
    RuleViolation, TILE_COUNT, Tile, Token, TsuroError,
};

/// Fewest players in a game.
pub const MIN_PLAYERS: usize = 3;
/// Most players in a game.
pub const MAX_PLAYERS: usize = 5;

const OPENING_HAND: usize = 3;
const LATER_HAND: usize = 2;

/// Why the referee refused a move. The mover is ejected in every case.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// The player forfeited, timed out, or sent garbage.
    #[display("Did not submit a move")]
    NoMove,
    /// The tile index was not dealt this turn.
    #[display("Played a tile not found in hand")]
    TileNotInHand,
    /// The placement names another player's color.
    #[display("Played a move for another color")]
    WrongColor,
    /// A placement rule failed.
    #[display("{_0}")]
    Rule(RuleViolation),
}

/// Where the game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No turn has run yet.
    NotStarted,
    /// Turns are being played in this round.
    Running {
        /// Zero-based round number.
        round: u32,
    },
    /// Results have been sent; no more turns run.
    Ended,
}

struct Seat {
    player: Box<dyn Player>,
    color: Color,
    token: Option<Token>,
    state: PlayerState,
    dealt: Vec<usize>,
}

impl Seat {
    fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.player.name().to_string(),
            color: self.color,
            token: self.token,
            state: self.state,
        }
    }
}

/// Runs one game: owns the board, the turn order, and every player's fate.
///
/// Turns are strictly sequential. Callers drive the game with
/// [`Referee::run_turn`] until it returns `false`.
pub struct Referee {
    seats: Vec<Seat>,
    rules: RuleSet,
    board: Board,
    turn_index: Option<usize>,
    round: Option<u32>,
    hand_size: usize,
    next_tile: usize,
    start_positions: HashSet<Token>,
    results: GameResults,
    ended: bool,
}

impl Referee {
    /// Seats the players youngest first and hands out colors in that order.
    ///
    /// # Errors
    ///
    /// [`TsuroError::InvalidGame`] unless there are 3 to 5 players.
    #[instrument(skip(players), fields(count = players.len()))]
    pub async fn new(players: Vec<Box<dyn Player>>) -> Result<Self, TsuroError> {
        Self::with_rules(players, RuleSet::standard()).await
    }

    /// Like [`Referee::new`] with a custom rule set.
    pub async fn with_rules(
        mut players: Vec<Box<dyn Player>>,
        rules: RuleSet,
    ) -> Result<Self, TsuroError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(TsuroError::game(format!("Invalid number of players {}", players.len())));
        }

        players.sort_by_key(|player| player.age());

        let mut seats = Vec::with_capacity(players.len());
        for (mut player, color) in players.into_iter().zip(Color::iter()) {
            player.receive_color(color).await;
            info!(player = player.name(), %color, "Player seated");
            seats.push(Seat {
                player,
                color,
                token: None,
                state: PlayerState::Alive,
                dealt: Vec::new(),
            });
        }

        Ok(Self {
            seats,
            rules,
            board: Board::new(),
            turn_index: None,
            round: None,
            hand_size: OPENING_HAND,
            next_tile: 0,
            start_positions: HashSet::new(),
            results: GameResults::new(),
            ended: false,
        })
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        match (self.ended, self.round) {
            (true, _) => Phase::Ended,
            (false, None) => Phase::NotStarted,
            (false, Some(round)) => Phase::Running { round },
        }
    }

    /// Eliminations so far.
    pub fn results(&self) -> &GameResults {
        &self.results
    }

    /// Every player in turn order.
    pub fn players(&self) -> Vec<PlayerSummary> {
        self.seats.iter().map(Seat::summary).collect()
    }

    /// Number of players still taking turns.
    pub fn active_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.state.is_active()).count()
    }

    /// Plays one turn.
    ///
    /// Returns `Ok(false)` once nobody is left; the first such call sends the
    /// results to every player who was not ejected.
    ///
    /// # Errors
    ///
    /// Fails only when the board is found to be inconsistent.
    #[instrument(skip(self), fields(round = ?self.round))]
    pub async fn run_turn(&mut self) -> Result<bool, TsuroError> {
        if self.ended {
            return Ok(false);
        }
        if self.active_count() == 0 {
            self.finish().await;
            return Ok(false);
        }

        self.broadcast_state().await;

        let current = self.advance_turn();
        let hand = self.deal(current)?;
        let seat = &mut self.seats[current];
        seat.player.receive_tiles(&hand).await;

        let placement = seat.player.next_move(&self.board, &hand).await;
        match self.judge(current, placement, &hand) {
            Ok(placement) => {
                self.commit(current, &placement)?;
                self.seats[current].player.receive_move_success().await;
                self.update_states()?;
            }
            Err(MoveRejection::Rule(RuleViolation::Invariant(reason))) => {
                return Err(TsuroError::InvalidBoard { reason });
            }
            Err(rejection) => self.eject(current, &rejection).await,
        }
        Ok(true)
    }

    async fn finish(&mut self) {
        info!(eliminated = self.results.len(), "Game over");
        for seat in &mut self.seats {
            if seat.state != PlayerState::Ejected {
                seat.player.receive_game_end(&self.results).await;
            }
        }
        self.ended = true;
    }

    async fn broadcast_state(&mut self) {
        let players = self.players();
        for (seat, me) in self.seats.iter_mut().zip(&players) {
            if seat.state != PlayerState::Ejected {
                seat.player.receive_gamestate(&self.board, me, &players).await;
            }
        }
    }

    /// Moves to the next active seat, counting rounds as the order wraps.
    fn advance_turn(&mut self) -> usize {
        loop {
            let next = self.turn_index.map_or(0, |index| (index + 1) % self.seats.len());
            if next == 0 {
                let round = self.round.map_or(0, |round| round + 1);
                self.round = Some(round);
                if round >= 1 {
                    self.hand_size = LATER_HAND;
                }
            }
            self.turn_index = Some(next);
            if self.seats[next].state.is_active() {
                debug!(round = ?self.round, color = %self.seats[next].color, "Turn begins");
                return next;
            }
        }
    }

    fn deal(&mut self, seat: usize) -> Result<Vec<Tile>, TsuroError> {
        let indices: Vec<usize> = (0..self.hand_size)
            .map(|_| {
                let index = self.next_tile;
                self.next_tile = (self.next_tile + 1) % TILE_COUNT;
                index
            })
            .collect();
        debug!(color = %self.seats[seat].color, ?indices, "Dealt tiles");

        let hand = indices
            .iter()
            .map(|&index| Tile::new(index, Rotation::None))
            .collect::<Result<Vec<_>, _>>()?;
        self.seats[seat].dealt = indices;
        Ok(hand)
    }

    fn judge(
        &self,
        current: usize,
        placement: Option<Placement>,
        hand: &[Tile],
    ) -> Result<Placement, MoveRejection> {
        let seat = &self.seats[current];
        let placement = placement.ok_or(MoveRejection::NoMove)?;
        if !seat.dealt.contains(&placement.index()) {
            return Err(MoveRejection::TileNotInHand);
        }
        if placement.color() != seat.color {
            return Err(MoveRejection::WrongColor);
        }
        let context = PlayerContext::new(seat.token, hand);
        self.rules
            .validate(&placement, &self.board, &context)
            .map_err(MoveRejection::Rule)?;
        Ok(placement)
    }

    #[instrument(
        skip(self),
        fields(
            color = %placement.color(),
            x = placement.position().x(),
            y = placement.position().y()
        )
    )]
    fn commit(&mut self, current: usize, placement: &Placement) -> Result<(), TsuroError> {
        let tile = placement.tile()?;
        let position = placement.position();
        let seat = &mut self.seats[current];

        let token = match (placement.kind(), seat.token) {
            (PlacementKind::Initial { port }, _) => {
                self.start_positions.insert(Token::new(position, port));
                Token::new(position, tile.exit_port(port))
            }
            (PlacementKind::Intermediate, Some(previous)) => {
                Token::new(position, tile.exit_port(previous.port().neighbor()))
            }
            (PlacementKind::Intermediate, None) => {
                return Err(TsuroError::placement("intermediate placement without a token"));
            }
        };
        seat.token = Some(token);
        self.board.add_tile(tile, position);
        info!(port = %token.port(), "Move committed");
        Ok(())
    }

    /// Walks every active token along its path and retires the ones that
    /// left the board.
    fn update_states(&mut self) -> Result<(), TsuroError> {
        let round = self.round.unwrap_or_default();
        for seat in self.seats.iter_mut().filter(|seat| seat.state.is_active()) {
            let Some(token) = seat.token else {
                continue;
            };
            let (token, state) = match self.board.trace(token)? {
                PathEnd::OnBoard(token) => (token, PlayerState::Alive),
                PathEnd::OffBoard(token) if self.start_positions.contains(&token) => {
                    (token, PlayerState::Collided)
                }
                PathEnd::OffBoard(token) => (token, PlayerState::Dead),
            };
            seat.token = Some(token);
            seat.state = state;
            if !state.is_active() {
                info!(
                    player = seat.player.name(),
                    color = %seat.color,
                    %state,
                    round,
                    "Player out"
                );
                self.results
                    .record(round, Elimination::new(seat.player.name(), seat.color, state));
            }
        }
        Ok(())
    }

    async fn eject(&mut self, current: usize, rejection: &MoveRejection) {
        let round = self.round.unwrap_or_default();
        let seat = &mut self.seats[current];
        warn!(
            player = seat.player.name(),
            color = %seat.color,
            reason = %rejection,
            round,
            "Player ejected"
        );
        seat.player.receive_move_failure(&rejection.to_string()).await;
        seat.state = PlayerState::Ejected;
        self.results.record(
            round,
            Elimination::new(seat.player.name(), seat.color, PlayerState::Ejected),
        );
    }
}

impl std::fmt::Debug for Referee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Referee")
            .field("phase", &self.phase())
            .field("players", &self.players())
            .field("tiles_placed", &self.board.tile_count())
            .field("next_tile", &self.next_tile)
            .finish_non_exhaustive()
    }
}
