//! Tests for the port algebra, tiles, and board lookups.

use strum::IntoEnumIterator;
use tsuro_core::{
    BOARD_SIZE, Board, Cell, Direction, PathEnd, Port, Position, Rotation, TILE_COUNT, Tile, Token,
    TsuroError,
};

#[test]
fn test_quarter_then_three_quarters_is_identity() {
    for port in Port::iter() {
        assert_eq!(port.rotated(Rotation::Quarter).rotated(Rotation::ThreeQuarters), port);
        assert_eq!(port.rotated(Rotation::None), port);
    }
}

#[test]
fn test_neighbor_pairs() {
    assert_eq!(Port::A.neighbor(), Port::F);
    assert_eq!(Port::B.neighbor(), Port::E);
    assert_eq!(Port::C.neighbor(), Port::H);
    assert_eq!(Port::D.neighbor(), Port::G);
}

#[test]
fn test_every_tile_is_a_perfect_matching_in_every_rotation() {
    for index in 0..TILE_COUNT {
        for rotation in Rotation::iter() {
            let tile = Tile::new(index, rotation).unwrap();
            let connections = tile.connections();
            assert_eq!(connections.len(), 4, "tile {index} @{rotation}");

            let mut seen: Vec<Port> = connections
                .iter()
                .flat_map(|c| {
                    let (a, b) = c.ports();
                    [a, b]
                })
                .collect();
            seen.sort();
            assert_eq!(seen, Port::ALL.to_vec());
        }
    }
}

#[test]
fn test_four_quarter_turns_restore_tile() {
    for index in 0..TILE_COUNT {
        let mut tile = Tile::new(index, Rotation::Quarter).unwrap();
        let original = tile.connections();
        for _ in 0..4 {
            tile.rotate_by(Rotation::Quarter);
        }
        assert_eq!(tile.connections(), original);
    }
}

#[test]
fn test_invalid_tile_index() {
    assert!(matches!(
        Tile::new(99, Rotation::None),
        Err(TsuroError::InvalidTile { index: 99 })
    ));
}

#[test]
fn test_placed_tile_is_found_and_edges_are_out_of_bounds() {
    let mut board = Board::new();
    let position = Position::new(7, 2).unwrap();
    board.add_tile(Tile::new(5, Rotation::Half).unwrap(), position);

    let Cell::Occupied(tile) = board.get_tile_at(7, 2) else {
        panic!("tile should be at (7, 2)");
    };
    assert_eq!(tile.index(), 5);
    assert_eq!(tile.rotation(), Rotation::Half);
    assert_eq!(tile.position(), Some(position));

    let size = i64::from(BOARD_SIZE);
    for i in -1..=size {
        assert_eq!(board.get_tile_at(-1, i), Cell::OutOfBounds);
        assert_eq!(board.get_tile_at(size, i), Cell::OutOfBounds);
        assert_eq!(board.get_tile_at(i, -1), Cell::OutOfBounds);
        assert_eq!(board.get_tile_at(i, size), Cell::OutOfBounds);
    }
}

#[test]
fn test_corner_cells_have_two_edges() {
    let corner = Position::new(0, 0).unwrap();
    let off_board: Vec<Direction> = Direction::iter()
        .filter(|&d| corner.adjacent(d).is_none())
        .collect();
    assert_eq!(off_board, vec![Direction::North, Direction::West]);
}

#[test]
fn test_path_winds_through_mixed_tiles() {
    let mut board = Board::new();
    // Tile 34 at (1, 0) turns a path entering at H north through A.
    board.add_tile(Tile::new(34, Rotation::None).unwrap(), Position::new(1, 0).unwrap());
    // Turned a half, tile 34 pairs A-H becomes E-D: entering D leaves at E.
    board.add_tile(Tile::new(34, Rotation::Half).unwrap(), Position::new(0, 1).unwrap());

    let start = Token::new(Position::new(0, 0).unwrap(), Port::C);
    assert_eq!(
        board.trace(start).unwrap(),
        PathEnd::OffBoard(Token::new(Position::new(1, 0).unwrap(), Port::A))
    );

    let start = Token::new(Position::new(1, 1).unwrap(), Port::G);
    assert_eq!(
        board.trace(start).unwrap(),
        PathEnd::OnBoard(Token::new(Position::new(0, 1).unwrap(), Port::E))
    );
}
