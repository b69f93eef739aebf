//! Path-routing tiles.

use crate::board::{BOARD_SIZE, Position};
use crate::catalog::Catalog;
use crate::error::{Result, TsuroError};
use crate::port::{Port, Rotation};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tracing::instrument;

/// An unordered pair of ports joined by a path on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Connection {
    low: Port,
    high: Port,
}

impl Connection {
    /// Creates a connection; port order does not matter.
    pub fn new(a: Port, b: Port) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Both ends of the connection, lower port first.
    pub fn ports(&self) -> (Port, Port) {
        (self.low, self.high)
    }

    /// The other end of the connection, if `port` is one of its ends.
    pub fn other(&self, port: Port) -> Option<Port> {
        if port == self.low {
            Some(self.high)
        } else if port == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// A tile drawn from the catalog, with its current rotation and, once
/// placed, its board position.
///
/// Equality and hashing use the catalog index only: two tiles with the same
/// pattern are the same tile type regardless of rotation or position. Use
/// [`Tile::position`] when placed instances must be told apart.
///
/// The only public mutation is [`Tile::rotate_by`].
#[derive(Debug, Clone)]
pub struct Tile {
    index: usize,
    rotation: Rotation,
    exits: [Port; 8],
    position: Option<Position>,
}

impl Tile {
    /// Builds catalog tile `index`, turned by `rotation`.
    ///
    /// # Errors
    ///
    /// Returns [`TsuroError::InvalidTile`] if `index` is not below [`crate::TILE_COUNT`].
    #[instrument]
    pub fn new(index: usize, rotation: Rotation) -> Result<Self> {
        let exits = *Catalog::get()?
            .exits(index)
            .ok_or(TsuroError::InvalidTile {
                index: index as i64,
            })?;

        let mut tile = Self {
            index,
            rotation: Rotation::None,
            exits,
            position: None,
        };
        tile.rotate_by(rotation);
        Ok(tile)
    }

    /// Catalog index of the pattern.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Board position, once placed.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The port a path leaves from when it enters at `entry`.
    ///
    /// Symmetric: `exit_port(exit_port(p)) == p`.
    pub fn exit_port(&self, entry: Port) -> Port {
        self.exits[entry.ordinal()]
    }

    /// The four connections at the current rotation, sorted.
    pub fn connections(&self) -> Vec<Connection> {
        let mut connections: Vec<Connection> = Port::ALL
            .iter()
            .filter(|&&port| port < self.exit_port(port))
            .map(|&port| Connection::new(port, self.exit_port(port)))
            .collect();
        connections.sort();
        connections
    }

    /// Turns the tile clockwise; rotating by [`Rotation::None`] changes nothing.
    pub fn rotate_by(&mut self, rotation: Rotation) {
        if rotation == Rotation::None {
            return;
        }
        let mut exits = self.exits;
        for port in Port::ALL {
            exits[port.rotated(rotation).ordinal()] = self.exit_port(port).rotated(rotation);
        }
        self.exits = exits;
        self.rotation = self.rotation.plus(rotation);
    }

    /// Consuming form of [`Tile::rotate_by`].
    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotate_by(rotation);
        self
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    /// Wire form `{index, rotation, x, y}`.
    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            index: self.index,
            rotation: self.rotation,
            x: self.position.map(|p| p.x()),
            y: self.position.map(|p| p.y()),
        }
    }

    /// Rebuilds a tile from its wire form.
    ///
    /// # Errors
    ///
    /// Fails on an unknown index, or when only one coordinate is present or a
    /// coordinate is off the board.
    #[instrument]
    pub fn from_snapshot(snapshot: &TileSnapshot) -> Result<Self> {
        let mut tile = Self::new(snapshot.index, snapshot.rotation)?;
        match (snapshot.x, snapshot.y) {
            (Some(x), Some(y)) => {
                let position = Position::new(x, y).ok_or_else(|| TsuroError::InvalidBoard {
                    reason: format!(
                        "tile position ({x}, {y}) is outside a {BOARD_SIZE}x{BOARD_SIZE} board"
                    ),
                })?;
                tile.set_position(position);
            }
            (None, None) => {}
            _ => {
                return Err(TsuroError::InvalidBoard {
                    reason: "tile has only one coordinate".to_string(),
                });
            }
        }
        Ok(tile)
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// Serialized tile: `{"index": 3, "rotation": 90, "x": 0, "y": 4}`.
///
/// `x` and `y` are `null` for tiles that have not been placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    /// Catalog index.
    pub index: usize,
    /// Rotation in degrees.
    pub rotation: Rotation,
    /// Column, once placed.
    pub x: Option<u8>,
    /// Row, once placed.
    pub y: Option<u8>,
}
