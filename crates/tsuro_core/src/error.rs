//! Error types for the rules engine.

use crate::port::Port;

/// Hard failures: malformed input, bad configuration, or a broken board invariant.
///
/// Rule violations are not errors; see [`crate::RuleViolation`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TsuroError {
    /// Catalog index outside `0..TILE_COUNT`.
    #[display("No such tile with index {index}")]
    InvalidTile {
        /// The rejected index.
        index: i64,
    },

    /// A placement could not be constructed from its input.
    #[display("Invalid placement: {reason}")]
    InvalidPlacement {
        /// What was wrong with the input.
        reason: String,
    },

    /// The game could not be set up.
    #[display("Invalid game: {reason}")]
    InvalidGame {
        /// What was wrong with the setup.
        reason: String,
    },

    /// A board snapshot could not be rebuilt.
    #[display("Invalid board: {reason}")]
    InvalidBoard {
        /// What was wrong with the snapshot.
        reason: String,
    },

    /// The embedded tile catalog failed validation.
    #[display("Invalid tile catalog: {reason}")]
    InvalidCatalog {
        /// What was wrong with the catalog.
        reason: String,
    },

    /// A path trace exceeded the number of connections on the board.
    #[display("Path from ({x}, {y}) port {port} did not terminate after {steps} steps")]
    CyclicPath {
        /// Column the trace started from.
        x: u8,
        /// Row the trace started from.
        y: u8,
        /// Port the trace started from.
        port: Port,
        /// Steps taken before giving up.
        steps: usize,
    },
}

impl std::error::Error for TsuroError {}

impl TsuroError {
    /// Shorthand for [`TsuroError::InvalidPlacement`].
    pub fn placement(reason: impl Into<String>) -> Self {
        Self::InvalidPlacement {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`TsuroError::InvalidGame`].
    pub fn game(reason: impl Into<String>) -> Self {
        Self::InvalidGame {
            reason: reason.into(),
        }
    }
}

/// Result alias used across the rules engine.
pub type Result<T> = std::result::Result<T, TsuroError>;
