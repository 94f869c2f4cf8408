//! Gesture state: what the active pointers are doing to the table.
//!
//! ```text
//! Idle -> Pending -> Dragging | Panning -> Idle
//!            \______ second pointer ______> Pinching -> Idle
//! ```

use crate::board::Board;
use crate::camera::Pinch;
use crate::input::PointerId;
use crate::piece::PieceId;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// A piece picked up by a pointer press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub piece: PieceId,
    /// World offset from the piece's top-left to the press point.
    pub offset: Vec2,
}

/// State for moving a whole group with one pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub pointer: PointerId,
    /// The piece under the pointer.
    pub piece: PieceId,
    pub grab_offset: Vec2,
    /// Every member of the dragged group.
    pub members: Vec<PieceId>,
    /// Member positions when the drag started.
    pub origins: HashMap<PieceId, Point>,
}

impl DragState {
    /// Capture the group of `grab.piece` at its current position.
    pub fn new(board: &Board, pointer: PointerId, grab: Grab) -> Self {
        let members = board.group_of(grab.piece);
        let origins = members
            .iter()
            .filter_map(|&id| board.get(id).map(|p| (id, p.position)))
            .collect();
        Self {
            pointer,
            piece: grab.piece,
            grab_offset: grab.offset,
            members,
            origins,
        }
    }

    /// Delta from the drag start for a pointer at `pointer_world`.
    pub fn delta(&self, pointer_world: Point) -> Vec2 {
        let origin = self.origins.get(&self.piece).copied().unwrap_or(Point::ZERO);
        (pointer_world - self.grab_offset) - origin
    }

    /// Place every member at its origin plus the current delta.
    ///
    /// Positions are always derived from the origins and the absolute
    /// pointer location, never accumulated from incremental moves.
    pub fn apply(&self, board: &mut Board, pointer_world: Point) {
        let delta = self.delta(pointer_world);
        for (&id, &origin) in &self.origins {
            if let Some(piece) = board.get_mut(id) {
                piece.position = origin + delta;
            }
        }
    }

    /// Put every member back where the drag started.
    pub fn revert(&self, board: &mut Board) {
        for (&id, &origin) in &self.origins {
            if let Some(piece) = board.get_mut(id) {
                piece.position = origin;
            }
        }
    }
}

/// Current interpretation of the active pointers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// One pointer is down but has not moved past the drag threshold.
    Pending {
        pointer: PointerId,
        /// Piece under the press, if any. `None` turns into a pan.
        grab: Option<Grab>,
        is_touch: bool,
    },
    Dragging(DragState),
    Panning {
        pointer: PointerId,
        start_screen: Point,
        start_offset: Vec2,
    },
    Pinching {
        pointers: (PointerId, PointerId),
        pinch: Pinch,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Dragging(_))
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self, Gesture::Pinching { .. })
    }

    /// Whether `pointer` drives this gesture.
    pub fn involves(&self, pointer: PointerId) -> bool {
        match self {
            Gesture::Idle => false,
            Gesture::Pending { pointer: p, .. } | Gesture::Panning { pointer: p, .. } => *p == pointer,
            Gesture::Dragging(drag) => drag.pointer == pointer,
            Gesture::Pinching { pointers, .. } => pointers.0 == pointer || pointers.1 == pointer,
        }
    }
}

/// Piece to pick up at `world_point`.
///
/// Among all unlocked pieces under the point, the one in the smallest group
/// wins so small clusters stay reachable behind big ones; ties go to the
/// topmost piece.
pub fn hit_test(board: &Board, world_point: Point) -> Option<PieceId> {
    let mut best: Option<(PieceId, usize)> = None;
    for piece in board.pieces_top_down() {
        if piece.is_locked() || !piece.contains(world_point) {
            continue;
        }
        let size = board.group_size(piece.id);
        if best.is_none_or(|(_, best_size)| size < best_size) {
            best = Some((piece.id, size));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;

    fn stacked_board() -> Board {
        // Three pieces stacked on the same spot, 2 on top.
        Board::from_pieces(
            (0..3)
                .map(|i| Piece::new(i, 100.0, 100.0, Point::new(i as f64 * 100.0, 0.0)))
                .map(|mut p| {
                    p.position = Point::ZERO;
                    p
                })
                .collect(),
        )
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let board = stacked_board();
        assert_eq!(hit_test(&board, Point::new(50.0, 50.0)), Some(2));
        assert_eq!(hit_test(&board, Point::new(150.0, 50.0)), None);
    }

    #[test]
    fn test_hit_test_prefers_smallest_group() {
        let mut board = stacked_board();
        board.connect(1, 2);
        assert_eq!(hit_test(&board, Point::new(50.0, 50.0)), Some(0));
    }

    #[test]
    fn test_hit_test_skips_locked() {
        let mut board = stacked_board();
        board.get_mut(2).unwrap().lock();
        assert_eq!(hit_test(&board, Point::new(50.0, 50.0)), Some(1));
    }

    #[test]
    fn test_drag_moves_group_rigidly_from_origins() {
        let mut board = stacked_board();
        board.get_mut(1).unwrap().position = Point::new(100.0, 0.0);
        board.connect(0, 1);
        let drag = DragState::new(&board, 0, Grab { piece: 0, offset: Vec2::new(10.0, 10.0) });

        drag.apply(&mut board, Point::new(60.0, 30.0));
        drag.apply(&mut board, Point::new(35.0, 40.0));
        assert_eq!(board.get(0).unwrap().position, Point::new(25.0, 30.0));
        assert_eq!(board.get(1).unwrap().position, Point::new(125.0, 30.0));
        assert_eq!(board.get(2).unwrap().position, Point::ZERO);

        drag.revert(&mut board);
        assert_eq!(board.get(1).unwrap().position, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_gesture_involves_pointer() {
        assert!(!Gesture::Idle.involves(0));
        let pending = Gesture::Pending { pointer: 4, grab: None, is_touch: true };
        assert!(pending.involves(4));
        assert!(!pending.involves(5));
    }
}
