//! Offline drivers: whole games from a list of names, and single rule checks.

use crate::players::{LocalPlayer, Player};
use crate::referee::Referee;
use crate::results::GameOutcome;
use crate::strategy::Dumb;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use tsuro_core::{
    Board, Color, PathEnd, Placement, PlacementKind, PlayerContext, Rotation, RuleSet,
    RuleViolation, Tile, Token, TsuroError,
};

/// Plays a full game between local players using the [`Dumb`] strategy.
///
/// Players are aged by their position in `names`.
///
/// # Errors
///
/// Fails on a bad player count or an inconsistent board.
#[instrument(skip(names), fields(players = names.len()))]
pub async fn run_game(names: &[String]) -> Result<GameOutcome, TsuroError> {
    let players: Vec<Box<dyn Player>> = names
        .iter()
        .zip(0u32..)
        .map(|(name, age)| {
            let strategy = Box::new(Dumb::default());
            Box::new(LocalPlayer::new(name.clone(), age, strategy)) as Box<dyn Player>
        })
        .collect();

    let mut referee = Referee::new(players).await?;
    let mut turns = 0usize;
    while referee.run_turn().await? {
        turns += 1;
    }

    info!(turns, tiles = referee.board().tile_count(), "Batch game finished");
    Ok(referee.results().outcome())
}

/// Board and tokens rebuilt from a list of moves, without validation.
#[derive(Debug, Default)]
pub struct Replay {
    board: Board,
    tokens: HashMap<Color, Token>,
}

impl Replay {
    /// Empty board, no tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// The board so far.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A player's token, once they have placed a tile.
    pub fn token(&self, color: Color) -> Option<Token> {
        self.tokens.get(&color).copied()
    }

    /// Places the tile, moves its owner's token onto it, then lets every token
    /// follow its path.
    ///
    /// # Errors
    ///
    /// Fails on an intermediate placement from a color with no token, or when
    /// a path does not terminate.
    pub fn apply(&mut self, placement: &Placement) -> Result<(), TsuroError> {
        let tile = placement.tile()?;
        let position = placement.position();
        let token = match placement.kind() {
            PlacementKind::Initial { port } => Token::new(position, tile.exit_port(port)),
            PlacementKind::Intermediate => {
                let previous = self.token(placement.color()).ok_or_else(|| {
                    TsuroError::game(format!(
                        "{} did not play an initial placement",
                        placement.color()
                    ))
                })?;
                Token::new(position, tile.exit_port(previous.port().neighbor()))
            }
        };
        self.tokens.insert(placement.color(), token);
        self.board.add_tile(tile, position);

        for token in self.tokens.values_mut() {
            *token = match self.board.trace(*token)? {
                PathEnd::OnBoard(end) | PathEnd::OffBoard(end) => end,
            };
        }
        Ok(())
    }
}

/// Decides whether the last entry of `instructions` is a legal move.
///
/// All entries but the last are placement arrays (see
/// [`Placement::from_json_array`]) applied in order with [`Replay::apply`].
/// The last is `[[color, index, rotation, x, y], index2, index3]`: an
/// intermediate placement plus the other two tiles in the mover's hand.
///
/// # Errors
///
/// Fails on malformed input, a mover with no token, or an inconsistent board.
#[instrument(skip(instructions), fields(count = instructions.len()))]
pub fn check_turn(instructions: &[Value]) -> Result<bool, TsuroError> {
    let (turn, setup) = instructions
        .split_last()
        .ok_or_else(|| TsuroError::placement("no turn to check"))?;

    let mut replay = Replay::new();
    for entry in setup {
        replay.apply(&Placement::from_json_array(entry)?)?;
    }

    let invalid = || TsuroError::placement(format!("{turn} is not a valid turn"));
    let parts = turn.as_array().filter(|parts| parts.len() == 3).ok_or_else(invalid)?;
    let placement = Placement::from_json_array(&parts[0])?;
    if placement.is_initial() {
        return Err(invalid());
    }

    let mut hand = vec![Tile::new(placement.index(), Rotation::None)?];
    for extra in &parts[1..] {
        let index = extra
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .ok_or_else(invalid)?;
        hand.push(Tile::new(index, Rotation::None)?);
    }

    let token = replay.token(placement.color()).ok_or_else(|| {
        TsuroError::game(format!("{} did not play an initial placement", placement.color()))
    })?;

    let context = PlayerContext::new(Some(token), &hand);
    match RuleSet::standard().validate(&placement, replay.board(), &context) {
        Ok(()) => Ok(true),
        Err(RuleViolation::Invariant(reason)) => Err(TsuroError::InvalidBoard { reason }),
        Err(violation) => {
            debug!(%violation, "Turn is illegal");
            Ok(false)
        }
    }
}
