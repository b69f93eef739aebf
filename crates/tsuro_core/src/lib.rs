//! Tsuro rules engine.
//!
//! Pure, synchronous game rules: the port and rotation algebra, the fixed
//! catalog of 35 tiles, the 10x10 board with path tracing, validated
//! placements, and the seven placement rules.
//!
//! # Example
//!
//! ```
//! use tsuro_core::{Board, Color, Placement, PlayerContext, Port, Rotation, RuleSet, Tile};
//!
//! # fn example() -> tsuro_core::Result<()> {
//! let board = Board::new();
//! let hand = [Tile::new(33, Rotation::None)?];
//! let placement = Placement::initial(33, Rotation::None, Color::White, 0, 0, Port::A)?;
//!
//! let context = PlayerContext::new(None, &hand);
//! let verdict = RuleSet::standard().validate(&placement, &board, &context);
//! assert!(verdict.is_ok());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod catalog;
mod color;
mod error;
mod placement;
mod port;
mod rules;
mod tile;

// Crate-level exports - Errors
pub use error::{Result, TsuroError};

// Crate-level exports - Algebra
pub use color::Color;
pub use port::{Direction, Port, Rotation};

// Crate-level exports - Tiles and board
pub use board::{BOARD_SIZE, Board, BoardSnapshot, Cell, PathEnd, Position, Token};
pub use catalog::{Catalog, TILE_COUNT};
pub use tile::{Connection, Tile, TileSnapshot};

// Crate-level exports - Moves and rules
pub use placement::{Placement, PlacementKind, PlacementMessage, PlacementType};
pub use rules::{
    FirstMoveCheckNeighbors, FirstMoveOnBorder, FirstMoveOutsidePort, InitialPlacementFirstOnly,
    IntermediateCheckPlacement, PlayerContext, Rule, RuleSet, RuleViolation, UnoccupiedSpace,
    WillPlayerSurvive,
};
