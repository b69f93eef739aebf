//! Port, direction, and rotation algebra.
//!
//! A tile has eight ports, two per side, labelled clockwise from the
//! left half of the north edge:
//!
//! ```text
//!        A   B
//!      +-------+
//!    H |       | C
//!      |       |
//!    G |       | D
//!      +-------+
//!        F   E
//! ```
//!
//! Every mapping here is a fixed table; nothing is derived from geometry at
//! runtime.

use crate::error::{Result, TsuroError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the eight edge ports of a tile.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum Port {
    /// North edge, left half.
    A,
    /// North edge, right half.
    B,
    /// East edge, upper half.
    C,
    /// East edge, lower half.
    D,
    /// South edge, right half.
    E,
    /// South edge, left half.
    F,
    /// West edge, lower half.
    G,
    /// West edge, upper half.
    H,
}

impl Port {
    /// All ports in clockwise order.
    pub const ALL: [Port; 8] = [
        Port::A,
        Port::B,
        Port::C,
        Port::D,
        Port::E,
        Port::F,
        Port::G,
        Port::H,
    ];

    /// Position of the port in clockwise order (A = 0).
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Port at the given clockwise position, wrapping mod 8.
    pub const fn from_ordinal(ordinal: usize) -> Port {
        Self::ALL[ordinal % 8]
    }

    /// The port this one lands on after turning the tile clockwise.
    pub const fn rotated(self, rotation: Rotation) -> Port {
        Self::from_ordinal(self.ordinal() + 2 * rotation.quarter_turns())
    }

    /// The port on the adjacent tile that touches this one across the shared edge.
    pub const fn neighbor(self) -> Port {
        match self {
            Port::A => Port::F,
            Port::B => Port::E,
            Port::C => Port::H,
            Port::D => Port::G,
            Port::E => Port::B,
            Port::F => Port::A,
            Port::G => Port::D,
            Port::H => Port::C,
        }
    }

    /// The side of the tile this port sits on.
    pub const fn direction(self) -> Direction {
        match self {
            Port::A | Port::B => Direction::North,
            Port::C | Port::D => Direction::East,
            Port::E | Port::F => Direction::South,
            Port::G | Port::H => Direction::West,
        }
    }
}

/// Compass direction on the board. North is toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Toward `y - 1`.
    North,
    /// Toward `x + 1`.
    East,
    /// Toward `y + 1`.
    South,
    /// Toward `x - 1`.
    West,
}

impl Direction {
    /// The direction facing back.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit step `(dx, dy)` for this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Clockwise tile rotation in 90 degree steps.
///
/// Serialized as its degree value (`0`, `90`, `180`, `270`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees clockwise.
    Quarter,
    /// 180 degrees.
    Half,
    /// 270 degrees clockwise.
    ThreeQuarters,
}

impl Rotation {
    /// Number of clockwise quarter turns.
    pub const fn quarter_turns(self) -> usize {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 1,
            Rotation::Half => 2,
            Rotation::ThreeQuarters => 3,
        }
    }

    /// Rotation for a number of quarter turns, wrapping mod 4.
    pub const fn from_quarter_turns(turns: usize) -> Rotation {
        match turns % 4 {
            0 => Rotation::None,
            1 => Rotation::Quarter,
            2 => Rotation::Half,
            _ => Rotation::ThreeQuarters,
        }
    }

    /// Rotation in degrees.
    pub const fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Parses a degree value; only 0, 90, 180, and 270 are accepted.
    pub fn from_degrees(degrees: i64) -> Result<Rotation> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarters),
            other => Err(TsuroError::placement(format!(
                "rotation must be one of 0, 90, 180, 270, got {other}"
            ))),
        }
    }

    /// Sum of two rotations, mod 360.
    pub const fn plus(self, other: Rotation) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }
}

impl TryFrom<u16> for Rotation {
    type Error = TsuroError;

    fn try_from(degrees: u16) -> Result<Self> {
        Self::from_degrees(i64::from(degrees))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degrees())
    }
}
