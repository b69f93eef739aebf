//! The 10x10 board and path tracing across placed tiles.

use crate::error::{Result, TsuroError};
use crate::port::{Direction, Port};
use crate::tile::{Tile, TileSnapshot};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 10;

/// A cell coordinate known to be on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    x: u8,
    y: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    x: u8,
    y: u8,
}

impl TryFrom<RawPosition> for Position {
    type Error = TsuroError;

    fn try_from(raw: RawPosition) -> Result<Self> {
        Position::new(raw.x, raw.y).ok_or_else(|| TsuroError::InvalidBoard {
            reason: format!("({}, {}) is off the board", raw.x, raw.y),
        })
    }
}

impl Position {
    /// Returns the position if both coordinates are below [`BOARD_SIZE`].
    pub fn new(x: u8, y: u8) -> Option<Self> {
        (x < BOARD_SIZE && y < BOARD_SIZE).then_some(Self { x, y })
    }

    /// Like [`Position::new`] for signed coordinates.
    pub fn from_signed(x: i64, y: i64) -> Option<Self> {
        Self::new(u8::try_from(x).ok()?, u8::try_from(y).ok()?)
    }

    /// Column, `0` is the west edge.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Row, `0` is the north edge.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// The neighboring cell in `direction`, or `None` past the edge.
    pub fn adjacent(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        Self::from_signed(i64::from(self.x) + i64::from(dx), i64::from(self.y) + i64::from(dy))
    }

    /// Whether the cell touches the edge of the board.
    pub fn is_on_border(self) -> bool {
        let last = BOARD_SIZE - 1;
        self.x == 0 || self.y == 0 || self.x == last || self.y == last
    }

    /// Every cell on the board, row by row.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Position { x, y }))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A player's marker: the tile it stands on and the port it faces out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Token {
    #[serde(flatten)]
    position: Position,
    port: Port,
}

impl Token {
    /// Cell holding the token's tile.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Port the token sits at, on the way out of its tile.
    pub fn port(&self) -> Port {
        self.port
    }

    /// The cell the token will enter next, or `None` if it faces the edge.
    pub fn facing(&self) -> Option<Position> {
        self.position.adjacent(self.port.direction())
    }
}

/// What lies at a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// A placed tile.
    Occupied(&'a Tile),
    /// An empty cell on the board.
    Empty,
    /// Beyond the edge of the board.
    OutOfBounds,
}

/// Where a traced path stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd {
    /// The last token faces an empty cell.
    OnBoard(Token),
    /// The last token faces the edge of the board.
    OffBoard(Token),
}

impl PathEnd {
    /// The token at the end of the path.
    pub fn token(&self) -> Token {
        match self {
            PathEnd::OnBoard(token) | PathEnd::OffBoard(token) => *token,
        }
    }

    /// Whether the path stays on the board.
    pub fn survives(&self) -> bool {
        matches!(self, PathEnd::OnBoard(_))
    }
}

/// Grid of placed tiles in wire form, indexed `[y][x]`.
pub type BoardSnapshot = Vec<Vec<Option<TileSnapshot>>>;

/// The game board.
///
/// Placement is append-only: a tile never moves or leaves once added.
/// The board does not enforce game rules; see [`crate::RuleSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    grid: Vec<Option<Tile>>,
    placed: Vec<Position>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            grid: vec![None; usize::from(BOARD_SIZE) * usize::from(BOARD_SIZE)],
            placed: Vec::new(),
        }
    }

    fn slot(position: Position) -> usize {
        usize::from(position.y) * usize::from(BOARD_SIZE) + usize::from(position.x)
    }

    /// Looks up any coordinate, including ones off the board.
    pub fn get_tile_at(&self, x: i64, y: i64) -> Cell<'_> {
        match Position::from_signed(x, y) {
            Some(position) => self.cell(position),
            None => Cell::OutOfBounds,
        }
    }

    /// Looks up an on-board cell.
    pub fn cell(&self, position: Position) -> Cell<'_> {
        match self.tile(position) {
            Some(tile) => Cell::Occupied(tile),
            None => Cell::Empty,
        }
    }

    /// Looks up the cell next to `position`, which may be off the board.
    pub fn cell_toward(&self, position: Position, direction: Direction) -> Cell<'_> {
        match position.adjacent(direction) {
            Some(next) => self.cell(next),
            None => Cell::OutOfBounds,
        }
    }

    /// The tile at `position`, if any.
    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.grid[Self::slot(position)].as_ref()
    }

    /// Whether `position` holds no tile.
    pub fn is_empty_at(&self, position: Position) -> bool {
        self.tile(position).is_none()
    }

    /// Puts `tile` at `position` and records the position on the tile.
    ///
    /// Called only after the move has been validated.
    #[instrument(skip(self, tile), fields(index = tile.index(), rotation = %tile.rotation()))]
    pub fn add_tile(&mut self, mut tile: Tile, position: Position) {
        tile.set_position(position);
        let slot = &mut self.grid[Self::slot(position)];
        if slot.replace(tile).is_none() {
            self.placed.push(position);
        }
        debug!(%position, placed = self.placed.len(), "Tile added to board");
    }

    /// A copy of the board with `tile` placed at `position`.
    pub fn with_tile(&self, tile: Tile, position: Position) -> Board {
        let mut board = self.clone();
        board.add_tile(tile, position);
        board
    }

    /// Placed tiles in the order they were added.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.placed.iter().filter_map(|&position| self.tile(position))
    }

    /// Number of placed tiles.
    pub fn tile_count(&self) -> usize {
        self.placed.len()
    }

    /// Follows a path from `start` across placed tiles until it faces an
    /// empty cell or the edge.
    ///
    /// Every step crosses one connection of a placed tile. A path through
    /// tiles is reversible (exits and neighbors are both involutions), so a
    /// path that begins at a board-edge port or an empty cell is simple and
    /// crosses each connection at most once; the walk is therefore bounded
    /// by four steps per placed tile.
    ///
    /// # Errors
    ///
    /// [`TsuroError::CyclicPath`] if the bound is exceeded, which means
    /// `start` was not reachable from the edge.
    #[instrument(level = "trace", skip(self))]
    pub fn trace(&self, start: Token) -> Result<PathEnd> {
        let bound = 4 * self.placed.len() + 1;
        let mut token = start;

        for _ in 0..bound {
            let Some(next) = token.facing() else {
                return Ok(PathEnd::OffBoard(token));
            };
            let Some(tile) = self.tile(next) else {
                return Ok(PathEnd::OnBoard(token));
            };
            token = Token::new(next, tile.exit_port(token.port.neighbor()));
            trace!(position = %next, port = %token.port, "Path advanced");
        }

        Err(TsuroError::CyclicPath {
            x: start.position.x,
            y: start.position.y,
            port: start.port,
            steps: bound,
        })
    }

    /// Traces the path of a player entering `tile` at `entry`, as if `tile`
    /// were placed at `position`. The board itself is unchanged.
    pub fn trace_entry(&self, tile: &Tile, position: Position, entry: Port) -> Result<PathEnd> {
        let start = Token::new(position, tile.exit_port(entry));
        self.with_tile(tile.clone(), position).trace(start)
    }

    /// Wire form of the grid.
    pub fn snapshot(&self) -> BoardSnapshot {
        (0..BOARD_SIZE)
            .map(|y| {
                (0..BOARD_SIZE)
                    .map(|x| {
                        Position::new(x, y)
                            .and_then(|position| self.tile(position))
                            .map(Tile::snapshot)
                    })
                    .collect()
            })
            .collect()
    }

    /// Rebuilds a board from its wire form.
    ///
    /// # Errors
    ///
    /// Fails if the grid is not 10x10, a tile is unknown, or a tile's recorded
    /// coordinates disagree with its cell.
    #[instrument(skip(snapshot))]
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Board> {
        let size = usize::from(BOARD_SIZE);
        if snapshot.len() != size || snapshot.iter().any(|row| row.len() != size) {
            return Err(TsuroError::InvalidBoard {
                reason: format!("grid must be {size}x{size}"),
            });
        }

        let mut board = Board::new();
        for position in Position::all() {
            let cell = &snapshot[usize::from(position.y)][usize::from(position.x)];
            let Some(tile_snapshot) = cell else {
                continue;
            };
            let tile = Tile::from_snapshot(tile_snapshot)?;
            if tile.position().is_some_and(|recorded| recorded != position) {
                return Err(TsuroError::InvalidBoard {
                    reason: format!(
                        "tile recorded at {:?} sits in cell {position}",
                        tile.position()
                    ),
                });
            }
            board.add_tile(tile, position);
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::Rotation;

    fn tile(index: usize, rotation: Rotation) -> Tile {
        Tile::new(index, rotation).unwrap()
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_add_then_get() {
        let mut board = Board::new();
        board.add_tile(tile(3, Rotation::None), pos(2, 7));
        match board.get_tile_at(2, 7) {
            Cell::Occupied(t) => {
                assert_eq!(t.index(), 3);
                assert_eq!(t.position(), Some(pos(2, 7)));
            }
            other => panic!("expected a tile, got {other:?}"),
        }
        assert_eq!(board.get_tile_at(7, 2), Cell::Empty);
    }

    #[test]
    fn test_out_of_bounds_is_not_empty() {
        let board = Board::new();
        for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 10), (10, 10), (-5, 42)] {
            assert_eq!(board.get_tile_at(x, y), Cell::OutOfBounds, "({x}, {y})");
        }
        assert_eq!(board.get_tile_at(9, 9), Cell::Empty);
    }

    #[test]
    fn test_same_pattern_tiles_tracked_by_position() {
        let mut board = Board::new();
        board.add_tile(tile(0, Rotation::None), pos(0, 0));
        board.add_tile(tile(0, Rotation::None), pos(5, 5));
        assert_eq!(board.tile_count(), 2);
        assert_eq!(board.tiles().count(), 2);
    }

    #[test]
    fn test_trace_stops_at_empty_cell() {
        let mut board = Board::new();
        // Tile 0 pairs A-B, C-D, E-F, G-H: a path entering at H leaves at G.
        board.add_tile(tile(0, Rotation::None), pos(1, 0));
        let end = board.trace(Token::new(pos(0, 0), Port::C)).unwrap();
        // C's neighbor is H; tile 0 sends H back out of G, still facing west.
        assert_eq!(end, PathEnd::OnBoard(Token::new(pos(1, 0), Port::G)));
    }

    #[test]
    fn test_trace_turns_back_and_stops_at_edge() {
        let mut board = Board::new();
        board.add_tile(tile(0, Rotation::None), pos(1, 0));
        let end = board.trace(Token::new(pos(2, 0), Port::G)).unwrap();
        // Neighbor of G is D; tile 0 pairs D with C, which faces back east.
        assert_eq!(end, PathEnd::OnBoard(Token::new(pos(1, 0), Port::C)));

        let end = board.trace(Token::new(pos(1, 1), Port::A)).unwrap();
        // Neighbor of A is F; tile 0 pairs F with E, which faces south.
        assert_eq!(end, PathEnd::OnBoard(Token::new(pos(1, 0), Port::E)));

        let off = board.trace(Token::new(pos(1, 0), Port::A)).unwrap();
        assert_eq!(off, PathEnd::OffBoard(Token::new(pos(1, 0), Port::A)));
    }

    #[test]
    fn test_trace_crosses_several_tiles() {
        let mut board = Board::new();
        // Tile 33 pairs A-F, B-E, C-H, D-G: straight lines through the tile.
        for x in 1..=3 {
            board.add_tile(tile(33, Rotation::None), pos(x, 4));
        }
        let end = board.trace(Token::new(pos(0, 4), Port::C)).unwrap();
        assert_eq!(end, PathEnd::OnBoard(Token::new(pos(3, 4), Port::C)));

        board.add_tile(tile(33, Rotation::None), pos(9, 4));
        for x in 4..=8 {
            board.add_tile(tile(33, Rotation::None), pos(x, 4));
        }
        let end = board.trace(Token::new(pos(0, 4), Port::C)).unwrap();
        assert_eq!(end, PathEnd::OffBoard(Token::new(pos(9, 4), Port::C)));
    }

    #[test]
    fn test_trace_detects_cycle() {
        // Tile 34 pairs A-H, B-C, D-E, F-G: four corner turns. A 2x2 block of
        // them closes a ring around the shared corner.
        let mut board = Board::new();
        board.add_tile(tile(34, Rotation::None), pos(4, 4));
        board.add_tile(tile(34, Rotation::None), pos(5, 4));
        board.add_tile(tile(34, Rotation::None), pos(4, 5));
        board.add_tile(tile(34, Rotation::None), pos(5, 5));
        // (4,4) D faces east into (5,4) at G; G-F leads south into (5,5) at A;
        // A-H leads west into (4,5) at C; C-B leads north into (4,4) at E;
        // E-D closes the loop.
        let err = board.trace(Token::new(pos(4, 4), Port::D)).unwrap_err();
        assert!(matches!(err, TsuroError::CyclicPath { steps: 17, .. }));
    }

    #[test]
    fn test_trace_entry_uses_hypothetical_tile() {
        let board = Board::new();
        let candidate = tile(0, Rotation::None);
        // Entering at A leaves through B, straight back off the north edge.
        let end = board.trace_entry(&candidate, pos(3, 0), Port::A).unwrap();
        assert!(!end.survives());
        assert_eq!(board.tile_count(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut board = Board::new();
        board.add_tile(tile(12, Rotation::Quarter), pos(0, 3));
        board.add_tile(tile(30, Rotation::Half), pos(9, 9));
        let snapshot = board.snapshot();
        assert_eq!(snapshot[3][0].unwrap().index, 12);
        assert_eq!(snapshot[3][0].unwrap().x, Some(0));
        assert!(snapshot[0][3].is_none());

        let rebuilt = Board::from_snapshot(&snapshot).unwrap();
        assert_eq!(rebuilt.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_rejects_bad_shape() {
        let snapshot: BoardSnapshot = vec![vec![None; 10]; 9];
        assert!(Board::from_snapshot(&snapshot).is_err());
    }

    #[test]
    fn test_token_json_is_flat() {
        let token = Token::new(pos(0, 9), Port::E);
        assert_eq!(
            serde_json::to_value(token).unwrap(),
            serde_json::json!({"x": 0, "y": 9, "port": "E"})
        );
    }
}
