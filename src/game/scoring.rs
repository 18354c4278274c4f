//! Star rating and hint targeting

use super::board::Board;
use crate::consts::MAX_STARS;
use crate::pattern::Shape;

/// Stars earned for a completion: 3 with no hints, 2 with one, 1 otherwise
pub fn stars_for_hints(hints_used: u32) -> u8 {
    match hints_used {
        0 => MAX_STARS,
        1 => 2,
        _ => 1,
    }
}

/// First unplaced shape in pattern order (not spatial order)
pub fn hint_target(board: &Board) -> Option<&Shape> {
    board
        .pattern()
        .shapes
        .iter()
        .find(|s| !board.is_placed(s.cell()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::PieceId;
    use crate::pattern::{Cell, Pattern, ShapeKind};
    use std::sync::Arc;

    #[test]
    fn test_star_table() {
        assert_eq!(stars_for_hints(0), 3);
        assert_eq!(stars_for_hints(1), 2);
        assert_eq!(stars_for_hints(2), 1);
        assert_eq!(stars_for_hints(40), 1);
    }

    #[test]
    fn test_hint_follows_list_order() {
        // Listed bottom-right first
        let pattern = Pattern::new(
            "h",
            3,
            vec![
                Shape { row: 2, col: 2, kind: ShapeKind::Star },
                Shape { row: 0, col: 0, kind: ShapeKind::Heart },
            ],
        )
        .unwrap();
        let mut board = Board::new(Arc::new(pattern));
        assert_eq!(hint_target(&board).map(Shape::cell), Some(Cell::new(2, 2)));

        board.drop_piece(PieceId(0), ShapeKind::Star, Some(Cell::new(2, 2)));
        assert_eq!(hint_target(&board).map(Shape::cell), Some(Cell::new(0, 0)));

        board.drop_piece(PieceId(1), ShapeKind::Heart, Some(Cell::new(0, 0)));
        assert_eq!(hint_target(&board), None);
    }
}
