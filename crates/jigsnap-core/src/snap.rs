//! Snap detection: finding the nearest valid mating neighbor of a moved piece.

use crate::board::Board;
use crate::config::EngineConfig;
use crate::piece::{Connection, Edge, Piece, PieceId, angle_delta, rotate_vec};
use kurbo::Point;
use std::collections::HashSet;

/// Rotations closer than this (degrees) count as equal.
const ROTATION_MATCH_TOLERANCE: f64 = 0.5;

/// Parameters for snap detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOptions {
    /// Maximum distance between proposed and expected centers (world units).
    pub threshold: f64,
    /// Skip neighbors whose rotation differs from the dragged piece.
    pub require_matching_rotation: bool,
}

impl From<&EngineConfig> for SnapOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            threshold: config.snap_threshold,
            require_matching_rotation: config.snap_requires_matching_rotation,
        }
    }
}

/// A valid snap of one dragged piece onto a neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    /// Piece of the dragged group that matched.
    pub dragged: PieceId,
    /// Neighbor it snaps to.
    pub target: PieceId,
    /// Top-left position that aligns `dragged` with `target`.
    pub position: Point,
    /// Edge of `dragged` that mates.
    pub edge: Edge,
    /// The mating slot on `dragged`.
    pub connection: Connection,
    /// Distance between proposed and aligned centers.
    pub distance: f64,
}

/// Where `dragged`'s center must be to sit against `target`.
///
/// The solved offset between the two centers is turned by the dragged
/// piece's rotation, then applied to the target's current center.
pub fn expected_center(dragged: &Piece, target: &Piece) -> Point {
    let solved_offset = dragged.solved_center() - target.solved_center();
    target.center() + rotate_vec(solved_offset, dragged.rotation)
}

/// Best snap for `dragged_id` if it were placed at `proposed_position`.
///
/// Candidates are visited in draw order; on an exact distance tie the
/// first one wins.
pub fn find_snap(
    board: &Board,
    dragged_id: PieceId,
    proposed_position: Point,
    options: SnapOptions,
) -> Option<SnapCandidate> {
    find_snap_by(board, dragged_id, proposed_position, options, &|_| true)
}

/// [`find_snap`] restricted to the candidates `accept` allows.
pub fn find_snap_by(
    board: &Board,
    dragged_id: PieceId,
    proposed_position: Point,
    options: SnapOptions,
    accept: &dyn Fn(&SnapCandidate) -> bool,
) -> Option<SnapCandidate> {
    let dragged = board.get(dragged_id)?;
    if !dragged.is_face_up() {
        return None;
    }
    let group: HashSet<PieceId> = board.group_of(dragged_id).into_iter().collect();
    let proposed_center = proposed_position + dragged.size() * 0.5;

    let mut best: Option<SnapCandidate> = None;
    for other in board.pieces_ordered() {
        if group.contains(&other.id) || !other.is_face_up() {
            continue;
        }
        let Some((edge, connection)) = dragged.connection_to(other.id) else {
            continue;
        };
        if options.require_matching_rotation
            && angle_delta(dragged.rotation, other.rotation).abs() > ROTATION_MATCH_TOLERANCE
        {
            continue;
        }
        let expected = expected_center(dragged, other);
        let distance = (proposed_center - expected).hypot();
        if distance >= options.threshold || best.is_some_and(|b| distance >= b.distance) {
            continue;
        }
        let candidate = SnapCandidate {
            dragged: dragged_id,
            target: other.id,
            position: expected - dragged.size() * 0.5,
            edge,
            connection: *connection,
            distance,
        };
        if accept(&candidate) {
            best = Some(candidate);
        }
    }
    best
}

/// Best snap over every member of a group, each at its current position.
///
/// Members are tried in the given order; on an exact tie the earlier
/// member keeps its candidate.
pub fn find_group_snap(
    board: &Board,
    members: &[PieceId],
    options: SnapOptions,
) -> Option<SnapCandidate> {
    find_group_snap_by(board, members, options, &|_| true)
}

/// [`find_group_snap`] restricted to the candidates `accept` allows.
pub fn find_group_snap_by(
    board: &Board,
    members: &[PieceId],
    options: SnapOptions,
    accept: &dyn Fn(&SnapCandidate) -> bool,
) -> Option<SnapCandidate> {
    let mut best: Option<SnapCandidate> = None;
    for &id in members {
        let Some(piece) = board.get(id) else { continue };
        if let Some(candidate) = find_snap_by(board, id, piece.position, options, accept) {
            if best.is_none_or(|b| candidate.distance < b.distance) {
                best = Some(candidate);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_grid_pieces;
    use crate::piece::Face;
    use kurbo::Vec2;

    const OPTIONS: SnapOptions = SnapOptions {
        threshold: 30.0,
        require_matching_rotation: true,
    };

    /// 2x2 grid of 100x100 cells with every piece spread apart.
    fn spread_board() -> Board {
        let mut pieces = build_grid_pieces(2, 2, 100.0, 100.0, 7);
        for piece in &mut pieces {
            piece.position = Point::new(piece.id as f64 * 400.0, 1000.0);
        }
        Board::from_pieces(pieces)
    }

    #[test]
    fn test_snaps_to_neighbor_within_threshold() {
        let board = spread_board();
        let anchor = board.get(0).unwrap().position;
        let proposed = anchor + Vec2::new(110.0, 5.0);
        let snap = find_snap(&board, 1, proposed, OPTIONS).unwrap();
        assert_eq!(snap.target, 0);
        assert_eq!(snap.edge, Edge::Left);
        assert_eq!(snap.position, anchor + Vec2::new(100.0, 0.0));
        assert!((snap.distance - (10.0f64 * 10.0 + 5.0 * 5.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_no_snap_beyond_threshold() {
        let board = spread_board();
        let anchor = board.get(0).unwrap().position;
        assert!(find_snap(&board, 1, anchor + Vec2::new(140.0, 0.0), OPTIONS).is_none());
    }

    #[test]
    fn test_non_neighbors_never_snap() {
        let board = spread_board();
        // 3 is diagonal to 0: no mating slot.
        let anchor = board.get(0).unwrap().position;
        assert!(find_snap(&board, 3, anchor + Vec2::new(100.0, 100.0), OPTIONS).is_none());
    }

    #[test]
    fn test_face_down_pieces_do_not_snap() {
        let mut board = spread_board();
        let anchor = board.get(0).unwrap().position;
        let proposed = anchor + Vec2::new(100.0, 0.0);

        board.get_mut(1).unwrap().face = Face::Down;
        assert!(find_snap(&board, 1, proposed, OPTIONS).is_none());

        board.get_mut(1).unwrap().face = Face::Up;
        board.get_mut(0).unwrap().face = Face::Down;
        assert!(find_snap(&board, 1, proposed, OPTIONS).is_none());
    }

    #[test]
    fn test_no_snap_within_own_group() {
        let mut board = spread_board();
        board.connect(0, 1);
        let anchor = board.get(0).unwrap().position;
        assert!(find_snap(&board, 1, anchor + Vec2::new(100.0, 0.0), OPTIONS).is_none());
    }

    #[test]
    fn test_expected_offset_follows_rotation() {
        let mut board = spread_board();
        for piece in board.pieces_mut() {
            piece.rotation = 90.0;
        }
        // Turned a quarter clockwise, 1 (right of 0) sits below 0.
        let anchor = board.get(0).unwrap().position;
        let snap = find_snap(&board, 1, anchor + Vec2::new(3.0, 98.0), OPTIONS).unwrap();
        assert_eq!(snap.target, 0);
        assert_eq!(snap.position, anchor + Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_mismatched_rotation_is_skipped() {
        let mut board = spread_board();
        board.get_mut(1).unwrap().rotation = 180.0;
        let anchor = board.get(0).unwrap().position;
        let proposed = anchor + Vec2::new(-100.0, 0.0);
        assert!(find_snap(&board, 1, proposed, OPTIONS).is_none());

        let relaxed = SnapOptions { require_matching_rotation: false, ..OPTIONS };
        assert_eq!(find_snap(&board, 1, proposed, relaxed).unwrap().target, 0);
    }

    #[test]
    fn test_group_snap_picks_global_minimum() {
        let mut board = spread_board();
        board.connect(0, 1);
        let p2 = board.get(2).unwrap().position;
        let p3 = board.get(3).unwrap().position;
        // Place the 0-1 pair so 0 is 12 units off 2 and 1 is 4 units off 3.
        board.get_mut(0).unwrap().position = p2 + Vec2::new(12.0, -100.0);
        board.get_mut(1).unwrap().position = p3 + Vec2::new(4.0, -100.0);

        let snap = find_group_snap(&board, &[0, 1], OPTIONS).unwrap();
        assert_eq!(snap.dragged, 1);
        assert_eq!(snap.target, 3);
        assert!((snap.distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_unique_candidate_independent_of_order() {
        let board = spread_board();
        let anchor = board.get(2).unwrap().position;
        let proposed = anchor + Vec2::new(2.0, -100.0);
        let expected = find_snap(&board, 0, proposed, OPTIONS).unwrap();

        let mut reversed: Vec<Piece> = board.snapshot();
        reversed.reverse();
        let board = Board::from_pieces(reversed);
        let again = find_snap(&board, 0, proposed, OPTIONS).unwrap();
        assert_eq!(expected, again);
        assert_eq!(again.target, 2);
    }

    #[test]
    fn test_exact_tie_goes_to_first_in_draw_order() {
        let mut board = spread_board();
        // 3 mates with 1 (above) and 2 (left); both sit solved, so a drop on
        // 3's solved spot is exactly aligned with each.
        for id in [1, 2] {
            let piece = board.get_mut(id).unwrap();
            piece.position = piece.solved_position();
        }
        let proposed = Point::new(100.0, 100.0);
        let snap = find_snap(&board, 3, proposed, OPTIONS).unwrap();
        assert_eq!(snap.target, 1);
        assert_eq!(snap.distance, 0.0);

        let mut reversed = board.snapshot();
        reversed.reverse();
        let board = Board::from_pieces(reversed);
        assert_eq!(find_snap(&board, 3, proposed, OPTIONS).unwrap().target, 2);
    }

    #[test]
    fn test_group_tie_goes_to_first_member() {
        let mut board = spread_board();
        board.connect(0, 1);
        for id in [2, 3] {
            let piece = board.get_mut(id).unwrap();
            piece.position = piece.solved_position();
        }
        // The 0-1 pair hovers 5 units right of its slot above 2 and 3.
        board.get_mut(0).unwrap().position = Point::new(5.0, 0.0);
        board.get_mut(1).unwrap().position = Point::new(105.0, 0.0);

        let snap = find_group_snap(&board, &[0, 1], OPTIONS).unwrap();
        assert_eq!((snap.dragged, snap.target), (0, 2));
        assert_eq!(snap.distance, 5.0);

        let snap = find_group_snap(&board, &[1, 0], OPTIONS).unwrap();
        assert_eq!((snap.dragged, snap.target), (1, 3));
    }

    #[test]
    fn test_rejected_candidate_falls_back_to_next_best() {
        let mut board = spread_board();
        for id in [1, 2] {
            let piece = board.get_mut(id).unwrap();
            piece.position = piece.solved_position();
        }
        // Both mates expect 3 on its solved spot, 4 units away.
        let proposed = Point::new(104.0, 100.0);
        let nearest = find_snap(&board, 3, proposed, OPTIONS).unwrap();
        assert_eq!(nearest.target, 1);

        let skip_one = |c: &SnapCandidate| c.target != 1;
        let snap = find_snap_by(&board, 3, proposed, OPTIONS, &skip_one).unwrap();
        assert_eq!(snap.target, 2);
        assert!(find_group_snap_by(&board, &[3], OPTIONS, &|_| false).is_none());
    }
}
