//! Move selection for local players.

use std::collections::VecDeque;
use tracing::{debug, instrument};
use tsuro_core::{
    BOARD_SIZE, Board, Cell, Color, Placement, PlayerContext, Port, Position, Rotation, RuleSet,
    Tile, Token,
};

/// Everything a strategy may look at when choosing a move.
///
/// The board is read-only. The hand is the player's own copy; strategies
/// may rotate those tiles.
pub struct Turn<'a> {
    /// Current board.
    pub board: &'a Board,
    /// The moving player's color.
    pub color: Color,
    /// The moving player's token, `None` before the first move.
    pub token: Option<Token>,
    /// Tiles dealt for this turn.
    pub hand: &'a mut [Tile],
}

/// A move-selection policy.
pub trait Strategy: Send {
    /// Picks a move, or `None` to forfeit.
    fn next_move(&mut self, turn: Turn<'_>) -> Option<Placement>;
}

/// Selectable built-in strategies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// See [`Dumb`].
    Dumb,
    /// See [`Second`].
    Second,
}

impl StrategyKind {
    /// Builds the strategy.
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Dumb => Box::new(Dumb::default()),
            StrategyKind::Second => Box::new(Second::default()),
        }
    }
}

/// Border cells walked clockwise from the north-west corner.
pub fn perimeter_clockwise() -> impl Iterator<Item = Position> {
    let last = BOARD_SIZE - 1;
    let north = (0..last).map(move |x| (x, 0));
    let east = (0..last).map(move |y| (last, y));
    let south = (1..=last).rev().map(move |x| (x, last));
    let west = (1..=last).rev().map(|y| (0, y));
    north
        .chain(east)
        .chain(south)
        .chain(west)
        .filter_map(|(x, y)| Position::new(x, y))
}

/// Border cells walked counter-clockwise from the north-west corner.
pub fn perimeter_counter_clockwise() -> impl Iterator<Item = Position> {
    let last = BOARD_SIZE - 1;
    let west = (0..last).map(|y| (0, y));
    let south = (0..last).map(move |x| (x, last));
    let east = (1..=last).rev().map(move |y| (last, y));
    let north = (1..=last).rev().map(|x| (x, 0));
    west.chain(south)
        .chain(east)
        .chain(north)
        .filter_map(|(x, y)| Position::new(x, y))
}

/// First port of `position`, clockwise from A, that faces the edge.
fn outward_port(board: &Board, position: Position) -> Option<Port> {
    Port::ALL
        .into_iter()
        .find(|port| matches!(board.cell_toward(position, port.direction()), Cell::OutOfBounds))
}

/// Tries the last hand tile, as held, at each border cell in turn.
fn first_legal_start(
    rules: &RuleSet,
    turn: &Turn<'_>,
    cells: impl Iterator<Item = Position>,
) -> Option<Placement> {
    let tile = turn.hand.last()?;
    let context = PlayerContext::new(None, &turn.hand[..]);
    cells
        .filter_map(|position| {
            let port = outward_port(turn.board, position)?;
            Placement::initial(
                tile.index(),
                tile.rotation(),
                turn.color,
                position.x(),
                position.y(),
                port,
            )
            .ok()
        })
        .find(|placement| rules.validate(placement, turn.board, &context).is_ok())
}

/// Starts at the first legal border cell going clockwise, then always plays
/// the first hand tile as held.
#[derive(Debug, Default)]
pub struct Dumb {
    rules: RuleSet,
}

impl Strategy for Dumb {
    #[instrument(skip_all, fields(color = %turn.color))]
    fn next_move(&mut self, turn: Turn<'_>) -> Option<Placement> {
        let Some(token) = turn.token else {
            return first_legal_start(&self.rules, &turn, perimeter_clockwise());
        };
        let target = token.facing()?;
        let tile = turn.hand.first()?;
        debug!(index = tile.index(), %target, "Playing first tile");
        Placement::intermediate(
            tile.index(),
            tile.rotation(),
            turn.color,
            target.x(),
            target.y(),
        )
        .ok()
    }
}

/// Starts at the first legal border cell going counter-clockwise. Later it
/// tries the second then the first hand tile in every rotation, falling back
/// to the second tile as held.
#[derive(Debug, Default)]
pub struct Second {
    rules: RuleSet,
}

impl Strategy for Second {
    #[instrument(skip_all, fields(color = %turn.color))]
    fn next_move(&mut self, turn: Turn<'_>) -> Option<Placement> {
        let Some(token) = turn.token else {
            return first_legal_start(&self.rules, &turn, perimeter_counter_clockwise());
        };
        let target = token.facing()?;
        let candidates = turn.hand.len().min(2);

        for slot in (0..candidates).rev() {
            for _ in 0..4 {
                let tile = &turn.hand[slot];
                let placement = Placement::intermediate(
                    tile.index(),
                    tile.rotation(),
                    turn.color,
                    target.x(),
                    target.y(),
                )
                .ok()?;
                let context = PlayerContext::new(Some(token), &turn.hand[..]);
                if self.rules.validate(&placement, turn.board, &context).is_ok() {
                    debug!(index = tile.index(), rotation = %tile.rotation(), "Found legal move");
                    return Some(placement);
                }
                turn.hand[slot].rotate_by(Rotation::Quarter);
            }
        }

        let fallback = turn.hand.get(1).or_else(|| turn.hand.first())?;
        debug!(index = fallback.index(), "No legal move, playing second tile");
        Placement::intermediate(
            fallback.index(),
            fallback.rotation(),
            turn.color,
            target.x(),
            target.y(),
        )
        .ok()
    }
}

/// Plays a fixed queue of moves, then forfeits.
#[derive(Debug, Default)]
pub struct Predetermined {
    moves: VecDeque<Placement>,
}

impl Predetermined {
    /// Plays `moves` in order.
    pub fn new(moves: impl IntoIterator<Item = Placement>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }
}

impl Strategy for Predetermined {
    fn next_move(&mut self, _: Turn<'_>) -> Option<Placement> {
        self.moves.pop_front()
    }
}
