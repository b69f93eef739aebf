//! Placement legality.
//!
//! Each rule is an independent predicate over a placement, the board, and the
//! moving player. The [`RuleSet`] runs them in a fixed order and reports the
//! first rejection.

use crate::board::{Board, Cell, Position, Token};
use crate::placement::{Placement, PlacementKind};
use crate::port::{Direction, Port, Rotation};
use crate::tile::Tile;
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// Why a placement was rejected.
///
/// Every variant except [`RuleViolation::Invariant`] is a normal game
/// outcome. `Invariant` means the board itself is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RuleViolation {
    /// Initial placement after the first move, or intermediate before it.
    #[display("initial placements are first round only")]
    InitialPlacementFirstOnly,
    /// Target cell already holds a tile.
    #[display("space occupied")]
    SpaceOccupied,
    /// The move walks the player off the board when a safe move existed.
    #[display("player does not survive")]
    PlayerDoesNotSurvive,
    /// Initial placement away from the edge.
    #[display("not_on_border")]
    NotOnBorder,
    /// Initial placement next to a placed tile.
    #[display("has neighbor")]
    HasNeighbor,
    /// Initial starting port does not face the edge.
    #[display("port not on outside edge")]
    PortNotOnOutsideEdge,
    /// Intermediate placement away from the cell the token faces.
    #[display("not adjacent to occupied port")]
    NotAdjacentToOccupiedPort,
    /// A path trace failed while evaluating the move.
    #[display("board invariant violated: {_0}")]
    Invariant(String),
}

impl std::error::Error for RuleViolation {}

/// What the rules may know about the moving player.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerContext<'a> {
    /// The player's token, `None` before their initial placement.
    pub token: Option<Token>,
    /// Tiles the player was dealt this turn.
    pub hand: &'a [Tile],
}

impl<'a> PlayerContext<'a> {
    /// Context for a player with the given token and hand.
    pub fn new(token: Option<Token>, hand: &'a [Tile]) -> Self {
        Self { token, hand }
    }
}

/// A single legality predicate.
pub trait Rule {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Accepts or rejects `placement`.
    fn check(
        &self,
        placement: &Placement,
        board: &Board,
        player: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation>;
}

/// A player without a token must play an initial placement; a player with
/// one must play an intermediate placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialPlacementFirstOnly;

impl Rule for InitialPlacementFirstOnly {
    fn name(&self) -> &'static str {
        "InitialPlacementFirstOnly"
    }

    fn check(
        &self,
        placement: &Placement,
        _: &Board,
        player: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        if placement.is_initial() == player.token.is_none() {
            Ok(())
        } else {
            Err(RuleViolation::InitialPlacementFirstOnly)
        }
    }
}

/// The target cell must be empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnoccupiedSpace;

impl Rule for UnoccupiedSpace {
    fn name(&self) -> &'static str {
        "UnoccupiedSpace"
    }

    fn check(
        &self,
        placement: &Placement,
        board: &Board,
        _: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        if board.is_empty_at(placement.position()) {
            Ok(())
        } else {
            Err(RuleViolation::SpaceOccupied)
        }
    }
}

/// Rejects a move that walks the player off the board, unless every tile in
/// the hand, in every rotation, would do the same.
///
/// Candidates are traced on a copy of the board holding the candidate tile,
/// entering at the starting port (initial) or at the neighbor of the token's
/// port (intermediate). Moves whose entry side is not the player's own path
/// are left to the positional rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct WillPlayerSurvive;

impl WillPlayerSurvive {
    fn entry(placement: &Placement, board: &Board, player: &PlayerContext<'_>) -> Option<Port> {
        match (placement.kind(), player.token) {
            (PlacementKind::Initial { port }, None) => {
                let outward = board.cell_toward(placement.position(), port.direction());
                matches!(outward, Cell::OutOfBounds).then_some(port)
            }
            (PlacementKind::Intermediate, Some(token)) => {
                (token.facing() == Some(placement.position())).then(|| token.port().neighbor())
            }
            _ => None,
        }
    }

    fn survives(
        board: &Board,
        tile: &Tile,
        position: Position,
        entry: Port,
    ) -> Result<bool, RuleViolation> {
        board
            .trace_entry(tile, position, entry)
            .map(|end| end.survives())
            .map_err(|e| RuleViolation::Invariant(e.to_string()))
    }
}

impl Rule for WillPlayerSurvive {
    fn name(&self) -> &'static str {
        "WillPlayerSurvive"
    }

    #[instrument(level = "debug", skip_all, fields(placement = %placement))]
    fn check(
        &self,
        placement: &Placement,
        board: &Board,
        player: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        let Some(entry) = Self::entry(placement, board, player) else {
            return Ok(());
        };
        let position = placement.position();
        let tile = placement
            .tile()
            .map_err(|e| RuleViolation::Invariant(e.to_string()))?;

        if Self::survives(board, &tile, position, entry)? {
            return Ok(());
        }

        for candidate in player.hand {
            for rotation in Rotation::iter() {
                let alternative = candidate.clone().rotated(rotation);
                if Self::survives(board, &alternative, position, entry)? {
                    debug!(
                        index = alternative.index(),
                        rotation = %alternative.rotation(),
                        "Safe alternative exists"
                    );
                    return Err(RuleViolation::PlayerDoesNotSurvive);
                }
            }
        }

        debug!("No hand tile survives, allowing forced move");
        Ok(())
    }
}

/// Initial placements go on the border.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMoveOnBorder;

impl Rule for FirstMoveOnBorder {
    fn name(&self) -> &'static str {
        "FirstMoveOnBorder"
    }

    fn check(
        &self,
        placement: &Placement,
        _: &Board,
        _: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        if !placement.is_initial() || placement.position().is_on_border() {
            Ok(())
        } else {
            Err(RuleViolation::NotOnBorder)
        }
    }
}

/// Initial placements may not touch a placed tile on any side.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMoveCheckNeighbors;

impl Rule for FirstMoveCheckNeighbors {
    fn name(&self) -> &'static str {
        "FirstMoveCheckNeighbors"
    }

    fn check(
        &self,
        placement: &Placement,
        board: &Board,
        _: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        if !placement.is_initial() {
            return Ok(());
        }
        let crowded = Direction::iter().any(|direction| {
            matches!(
                board.cell_toward(placement.position(), direction),
                Cell::Occupied(_)
            )
        });
        if crowded {
            Err(RuleViolation::HasNeighbor)
        } else {
            Ok(())
        }
    }
}

/// The starting port of an initial placement faces the edge of the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMoveOutsidePort;

impl Rule for FirstMoveOutsidePort {
    fn name(&self) -> &'static str {
        "FirstMoveOutsidePort"
    }

    fn check(
        &self,
        placement: &Placement,
        board: &Board,
        _: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        let Some(port) = placement.port() else {
            return Ok(());
        };
        match board.cell_toward(placement.position(), port.direction()) {
            Cell::OutOfBounds => Ok(()),
            _ => Err(RuleViolation::PortNotOnOutsideEdge),
        }
    }
}

/// Intermediate placements go on the cell the player's token faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntermediateCheckPlacement;

impl Rule for IntermediateCheckPlacement {
    fn name(&self) -> &'static str {
        "IntermediateCheckPlacement"
    }

    fn check(
        &self,
        placement: &Placement,
        _: &Board,
        player: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        if placement.is_initial() {
            return Ok(());
        }
        match player.token {
            Some(token) if token.facing() == Some(placement.position()) => Ok(()),
            _ => Err(RuleViolation::NotAdjacentToOccupiedPort),
        }
    }
}

/// An ordered list of rules, evaluated until the first rejection.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule + Send + Sync>>,
}

impl RuleSet {
    /// A rule set running `rules` in order.
    pub fn new(rules: Vec<Box<dyn Rule + Send + Sync>>) -> Self {
        Self { rules }
    }

    /// The seven standard rules in their standard order.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(InitialPlacementFirstOnly),
            Box::new(UnoccupiedSpace),
            Box::new(WillPlayerSurvive),
            Box::new(FirstMoveOnBorder),
            Box::new(FirstMoveCheckNeighbors),
            Box::new(FirstMoveOutsidePort),
            Box::new(IntermediateCheckPlacement),
        ])
    }

    /// Names of the rules, in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    /// Checks `placement` against every rule, stopping at the first rejection.
    #[instrument(skip(self, board, player), fields(placement = %placement))]
    pub fn validate(
        &self,
        placement: &Placement,
        board: &Board,
        player: &PlayerContext<'_>,
    ) -> Result<(), RuleViolation> {
        for rule in &self.rules {
            if let Err(violation) = rule.check(placement, board, player) {
                debug!(rule = rule.name(), %violation, "Placement rejected");
                return Err(violation);
            }
        }
        Ok(())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
