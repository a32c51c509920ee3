//! Reachability highlights guiding the player's next click.
//!
//! Every trace is repeated with a growing budget of arrow-induced turns so
//! that a cell reachable with fewer turns keeps the mark written by the
//! cheaper pass.

use robotrain_core::{Direction, PathChannel, Position, TileKind};

use crate::board::Board;

const TURN_BUDGET: i32 = 3;

/// Marks every cell reachable from the four neighbours of `origin`.
///
/// Each mark records the direction the trace initially left `origin` in.
pub(crate) fn flood(board: &mut Board, origin: Position, channel: PathChannel) {
    for turns in 0..=TURN_BUDGET {
        for direction in Direction::ALL {
            trace(board, origin.step(direction), direction, turns, channel);
        }
    }
}

/// Marks the single path that starts at `from` heading in `direction`.
pub(crate) fn follow(board: &mut Board, from: Position, direction: Direction) {
    for turns in 0..=TURN_BUDGET {
        trace(board, from, direction, turns, PathChannel::Train);
    }
}

fn trace(
    board: &mut Board,
    mut position: Position,
    initial: Direction,
    mut turns: i32,
    channel: PathChannel,
) {
    let mut direction = initial;
    while let Some(cell) = board.cell_at_mut(position) {
        if cell.contains(TileKind::Wall) {
            return;
        }
        cell.mark(channel, initial);

        let next = cell.arrow().unwrap_or(direction);
        if next != direction {
            turns -= 1;
            if turns < 0 {
                return;
            }
        }
        direction = next;
        position = position.step(direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robotrain_core::Tile;

    fn row_board(row: &[Tile]) -> Board {
        let mut board = Board::new();
        for (column, tile) in row.iter().enumerate() {
            board.place_tile(*tile, Position::new(0, column as i32));
        }
        board
    }

    fn marked(board: &Board, channel: PathChannel) -> Vec<(Position, Direction)> {
        board
            .cells()
            .filter_map(|(position, cell)| cell.marks().get(channel).map(|mark| (position, mark)))
            .collect()
    }

    #[test]
    fn follow_stops_before_walls() {
        let mut board = row_board(&[Tile::Floor, Tile::Floor, Tile::Wall, Tile::Floor]);
        follow(&mut board, Position::new(0, 0), Direction::Right);

        assert_eq!(
            marked(&board, PathChannel::Train),
            vec![
                (Position::new(0, 0), Direction::Right),
                (Position::new(0, 1), Direction::Right),
            ]
        );
    }

    #[test]
    fn arrows_bend_the_path() {
        let mut board = Board::new();
        for column in 0..3 {
            board.place_tile(Tile::Floor, Position::new(0, column));
            board.place_tile(Tile::Floor, Position::new(1, column));
        }
        board.place_tile(
            Tile::Arrow {
                direction: Direction::Down,
            },
            Position::new(0, 1),
        );

        follow(&mut board, Position::new(0, 0), Direction::Right);

        let cells: Vec<_> = marked(&board, PathChannel::Train)
            .into_iter()
            .map(|(position, _)| position)
            .collect();
        assert_eq!(
            cells,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );
    }

    #[test]
    fn turn_budget_limits_arrow_chains() {
        // Four arrows in a row each bend the path; only three bends are allowed.
        let mut board = Board::new();
        for row in 0..3 {
            for column in 0..3 {
                board.place_tile(Tile::Floor, Position::new(row, column));
            }
        }
        let arrows = [
            (Position::new(0, 1), Direction::Down),
            (Position::new(1, 1), Direction::Right),
            (Position::new(1, 2), Direction::Down),
            (Position::new(2, 2), Direction::Left),
        ];
        for (position, direction) in arrows {
            board.place_tile(Tile::Arrow { direction }, position);
        }

        follow(&mut board, Position::new(0, 0), Direction::Right);

        let marks = board.cell_at(Position::new(2, 2)).expect("cell").marks();
        assert_eq!(marks.on_train_path(), Some(Direction::Right));
        assert!(board
            .cell_at(Position::new(2, 1))
            .expect("cell")
            .marks()
            .on_train_path()
            .is_none());
    }

    #[test]
    fn flood_from_walled_start_marks_only_the_open_side() {
        let mut board = Board::new();
        for row in 0..3 {
            for column in 0..5 {
                let tile = if row == 1 && column >= 1 {
                    Tile::Floor
                } else {
                    Tile::Wall
                };
                board.place_tile(tile, Position::new(row, column));
            }
        }
        board.place_tile(Tile::Start, Position::new(1, 1));

        flood(&mut board, Position::new(1, 1), PathChannel::Train);

        assert_eq!(
            marked(&board, PathChannel::Train),
            vec![
                (Position::new(1, 2), Direction::Right),
                (Position::new(1, 3), Direction::Right),
                (Position::new(1, 4), Direction::Right),
            ]
        );
    }

    #[test]
    fn cheaper_passes_keep_their_marks() {
        // The upward trace bends back down through the origin into the cell
        // the straight downward trace already claimed.
        let mut board = Board::new();
        for row in 0..3 {
            for column in 0..3 {
                board.place_tile(Tile::Floor, Position::new(row, column));
            }
        }
        board.place_tile(
            Tile::Arrow {
                direction: Direction::Down,
            },
            Position::new(0, 1),
        );

        flood(&mut board, Position::new(1, 1), PathChannel::Launch);

        let below = board.cell_at(Position::new(2, 1)).expect("cell").marks();
        assert_eq!(below.on_launch_path(), Some(Direction::Down));
        assert!(below.on_train_path().is_none());
        let arrow = board.cell_at(Position::new(0, 1)).expect("cell").marks();
        assert_eq!(arrow.on_launch_path(), Some(Direction::Up));
    }
}
