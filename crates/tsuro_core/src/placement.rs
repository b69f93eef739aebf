//! Validated tile placements.
//!
//! A placement is a player's proposed move. It is checked for well-formedness
//! when it is built; whether it is *legal* is decided by the rule set.

use crate::board::{BOARD_SIZE, Position};
use crate::catalog::TILE_COUNT;
use crate::color::Color;
use crate::error::{Result, TsuroError};
use crate::port::{Port, Rotation};
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::instrument;

/// Whether a placement starts a path or continues one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    /// A player's first move, entering the tile at `port` from the edge.
    Initial {
        /// Starting port; must face the edge of the board.
        port: Port,
    },
    /// A later move on the cell the player's token faces.
    Intermediate,
}

/// A well-formed move: catalog tile, rotation, owner color, and target cell.
///
/// Serializes to and from the `MOVE_REQUEST` wire shape; see [`PlacementMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlacementMessage", into = "PlacementMessage")]
pub struct Placement {
    index: usize,
    rotation: Rotation,
    color: Color,
    position: Position,
    kind: PlacementKind,
}

impl Placement {
    /// Builds an initial placement.
    ///
    /// # Errors
    ///
    /// [`TsuroError::InvalidPlacement`] if the index or coordinates are out of range.
    #[instrument]
    pub fn initial(
        index: usize,
        rotation: Rotation,
        color: Color,
        x: u8,
        y: u8,
        port: Port,
    ) -> Result<Self> {
        Self::build(index, rotation, color, x, y, PlacementKind::Initial { port })
    }

    /// Builds an intermediate placement.
    ///
    /// # Errors
    ///
    /// [`TsuroError::InvalidPlacement`] if the index or coordinates are out of range.
    #[instrument]
    pub fn intermediate(
        index: usize,
        rotation: Rotation,
        color: Color,
        x: u8,
        y: u8,
    ) -> Result<Self> {
        Self::build(index, rotation, color, x, y, PlacementKind::Intermediate)
    }

    fn build(
        index: usize,
        rotation: Rotation,
        color: Color,
        x: u8,
        y: u8,
        kind: PlacementKind,
    ) -> Result<Self> {
        if index >= TILE_COUNT {
            return Err(TsuroError::placement(format!(
                "tile index must be 0..{}, got {index}",
                TILE_COUNT - 1
            )));
        }
        let position = Position::new(x, y).ok_or_else(|| {
            TsuroError::placement(format!(
                "x and y must be 0..{}, got ({x}, {y})",
                BOARD_SIZE - 1
            ))
        })?;
        Ok(Self {
            index,
            rotation,
            color,
            position,
            kind,
        })
    }

    /// Catalog index of the tile.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Rotation the tile is placed at.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Color of the player making the move.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Target cell.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Initial or intermediate.
    pub fn kind(&self) -> PlacementKind {
        self.kind
    }

    /// Starting port, for initial placements.
    pub fn port(&self) -> Option<Port> {
        match self.kind {
            PlacementKind::Initial { port } => Some(port),
            PlacementKind::Intermediate => None,
        }
    }

    /// Whether this is a player's first move.
    pub fn is_initial(&self) -> bool {
        matches!(self.kind, PlacementKind::Initial { .. })
    }

    /// Builds the tile this placement puts down.
    pub fn tile(&self) -> Result<Tile> {
        Tile::new(self.index, self.rotation)
    }

    /// Parses the flat array form used by batch drivers.
    ///
    /// - initial: `[index, rotation, color, port, x, y]`
    /// - intermediate: `[color, index, rotation, x, y]`
    ///
    /// # Errors
    ///
    /// [`TsuroError::InvalidPlacement`] for any other shape or out-of-range value.
    #[instrument(skip(value))]
    pub fn from_json_array(value: &Value) -> Result<Self> {
        let invalid = || TsuroError::placement(format!("{value} is not a valid placement"));
        let items = value.as_array().ok_or_else(invalid)?;

        let int = |i: usize| items[i].as_i64().ok_or_else(invalid);
        let text = |i: usize| items[i].as_str().ok_or_else(invalid);

        match items.len() {
            6 => Self::initial(
                parse_index(int(0)?)?,
                Rotation::from_degrees(int(1)?)?,
                parse_color(text(2)?)?,
                parse_coordinate(int(4)?)?,
                parse_coordinate(int(5)?)?,
                parse_port(text(3)?)?,
            ),
            5 => Self::intermediate(
                parse_index(int(1)?)?,
                Rotation::from_degrees(int(2)?)?,
                parse_color(text(0)?)?,
                parse_coordinate(int(3)?)?,
                parse_coordinate(int(4)?)?,
            ),
            _ => Err(invalid()),
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tile {} @{} at {}",
            self.color, self.index, self.rotation, self.position
        )?;
        if let Some(port) = self.port() {
            write!(f, " from port {port}")?;
        }
        Ok(())
    }
}

fn parse_index(index: i64) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < TILE_COUNT)
        .ok_or_else(|| TsuroError::placement(format!("no such tile with index {index}")))
}

fn parse_coordinate(value: i64) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|&v| v < BOARD_SIZE)
        .ok_or_else(|| {
            TsuroError::placement(format!("coordinates must be 0..{}, got {value}", BOARD_SIZE - 1))
        })
}

fn parse_color(color: &str) -> Result<Color> {
    Color::from_str(color)
        .map_err(|_| TsuroError::placement(format!("{color:?} is not a valid color")))
}

fn parse_port(port: &str) -> Result<Port> {
    Port::from_str(port).map_err(|_| TsuroError::placement(format!("{port:?} is not a valid port")))
}

/// Tag distinguishing the two placement shapes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementType {
    /// Carries a `port`.
    Initial,
    /// No `port`.
    Intermediate,
}

/// Unvalidated wire shape of a placement.
///
/// Fields are kept loose so that out-of-range values reach validation and
/// produce a descriptive error instead of a bare decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementMessage {
    /// `INITIAL` or `INTERMEDIATE`.
    pub placement_type: PlacementType,
    /// Catalog index.
    pub index: i64,
    /// Degrees.
    pub rotation: i64,
    /// Owner color name.
    pub color: String,
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Starting port name, initial placements only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

impl TryFrom<PlacementMessage> for Placement {
    type Error = TsuroError;

    fn try_from(message: PlacementMessage) -> Result<Self> {
        let index = parse_index(message.index)?;
        let rotation = Rotation::from_degrees(message.rotation)?;
        let color = parse_color(&message.color)?;
        let x = parse_coordinate(message.x)?;
        let y = parse_coordinate(message.y)?;

        match (message.placement_type, message.port) {
            (PlacementType::Initial, Some(port)) => {
                Self::initial(index, rotation, color, x, y, parse_port(&port)?)
            }
            (PlacementType::Initial, None) => {
                Err(TsuroError::placement("initial placement is missing its port"))
            }
            (PlacementType::Intermediate, Some(_)) => Err(TsuroError::placement(
                "intermediate placement must not carry a port",
            )),
            (PlacementType::Intermediate, None) => Self::intermediate(index, rotation, color, x, y),
        }
    }
}

impl From<Placement> for PlacementMessage {
    fn from(placement: Placement) -> Self {
        let placement_type = if placement.is_initial() {
            PlacementType::Initial
        } else {
            PlacementType::Intermediate
        };
        Self {
            placement_type,
            index: placement.index as i64,
            rotation: i64::from(placement.rotation.degrees()),
            color: placement.color.to_string(),
            x: i64::from(placement.position.x()),
            y: i64::from(placement.position.y()),
            port: placement.port().map(|port| port.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let err = Placement::intermediate(0, Rotation::None, Color::Red, 10, 0).unwrap_err();
        assert!(matches!(err, TsuroError::InvalidPlacement { .. }));
        assert!(Placement::initial(0, Rotation::None, Color::Red, 0, 10, Port::A).is_err());
        assert!(Placement::initial(35, Rotation::None, Color::Red, 0, 0, Port::A).is_err());
    }

    #[test]
    fn test_initial_array() {
        let placement = Placement::from_json_array(&json!([4, 90, "blue", "A", 0, 3])).unwrap();
        assert!(placement.is_initial());
        assert_eq!(placement.index(), 4);
        assert_eq!(placement.rotation(), Rotation::Quarter);
        assert_eq!(placement.color(), Color::Blue);
        assert_eq!(placement.port(), Some(Port::A));
        assert_eq!(placement.position(), Position::new(0, 3).unwrap());
    }

    #[test]
    fn test_intermediate_array() {
        let placement = Placement::from_json_array(&json!(["white", 12, 270, 5, 9])).unwrap();
        assert!(!placement.is_initial());
        assert_eq!(placement.index(), 12);
        assert_eq!(placement.color(), Color::White);
        assert_eq!(placement.position(), Position::new(5, 9).unwrap());
    }

    #[test]
    fn test_malformed_arrays() {
        for bad in [
            json!([1, 2, 3]),
            json!({"index": 1}),
            json!([4, 45, "blue", "A", 0, 3]),
            json!([4, 90, "purple", "A", 0, 3]),
            json!([4, 90, "blue", "Z", 0, 3]),
            json!([4, 90, "blue", "A", -1, 3]),
            json!(["white", "12", 270, 5, 9]),
            json!(["white", 12, 270, 5, 10]),
        ] {
            let err = Placement::from_json_array(&bad).unwrap_err();
            assert!(
                matches!(err, TsuroError::InvalidPlacement { .. }),
                "{bad} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn test_wire_round_trip() {
        let placements = [
            Placement::initial(9, Rotation::Half, Color::Green, 9, 0, Port::C).unwrap(),
            Placement::intermediate(33, Rotation::Quarter, Color::Black, 4, 7).unwrap(),
        ];
        for placement in placements {
            let wire = serde_json::to_string(&placement).unwrap();
            let parsed: Placement = serde_json::from_str(&wire).unwrap();
            assert_eq!(parsed, placement);
        }
    }

    #[test]
    fn test_wire_shape() {
        let placement = Placement::initial(9, Rotation::Half, Color::Green, 9, 0, Port::C).unwrap();
        assert_eq!(
            serde_json::to_value(&placement).unwrap(),
            json!({
                "placement_type": "INITIAL",
                "index": 9,
                "rotation": 180,
                "color": "green",
                "x": 9,
                "y": 0,
                "port": "C"
            })
        );
    }

    #[test]
    fn test_wire_rejects_missing_port() {
        let err = serde_json::from_value::<Placement>(json!({
            "placement_type": "INITIAL",
            "index": 9,
            "rotation": 180,
            "color": "green",
            "x": 9,
            "y": 0
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing its port"), "{err}");
    }
}
