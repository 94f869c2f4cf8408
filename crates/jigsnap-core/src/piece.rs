//! Piece model: geometry, orientation, face state and mating edges.

use crate::error::EngineResult;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable piece identifier assigned at generation time.
pub type PieceId = u32;

/// Rotation step applied by a single rotate gesture, in degrees.
pub const ROTATION_STEP_DEG: f64 = 90.0;

/// One of the four mating edges of a rectangular cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Slot index of this edge in `Piece::connections`.
    pub fn index(self) -> usize {
        match self {
            Edge::Top => 0,
            Edge::Right => 1,
            Edge::Bottom => 2,
            Edge::Left => 3,
        }
    }

    /// The edge a neighbor mates with.
    pub fn opposite(self) -> Self {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Right => Edge::Left,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
        }
    }
}

/// Whether an edge sticks out (tab) or is cut in (blank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Tab,
    Blank,
}

impl Polarity {
    pub fn opposite(self) -> Self {
        match self {
            Polarity::Tab => Polarity::Blank,
            Polarity::Blank => Polarity::Tab,
        }
    }
}

/// Which side of a piece faces the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    #[default]
    Up,
    Down,
}

impl Face {
    pub fn flipped(self) -> Self {
        match self {
            Face::Up => Face::Down,
            Face::Down => Face::Up,
        }
    }
}

/// A potential link from one piece edge to a neighbor, fixed at generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// The mating piece.
    pub piece: PieceId,
    /// The edge of the mating piece that meets this one.
    pub edge: Edge,
    /// Polarity of this piece's side of the joint.
    pub polarity: Polarity,
}

/// A rectangular puzzle piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub width: f64,
    pub height: f64,
    /// Top-left corner of the unrotated cell, in world units.
    pub position: Point,
    /// Rotation around the center in degrees, normalized to `[0, 360)`.
    /// Always a multiple of 90 outside of an animation.
    pub rotation: f64,
    pub face: Face,
    solved_position: Point,
    connections: [Option<Connection>; 4],
    #[serde(default)]
    connected: BTreeSet<PieceId>,
    #[serde(default)]
    group_id: PieceId,
    #[serde(default)]
    locked: bool,
}

impl Piece {
    /// Create a piece sitting at its solved position, face up and unrotated.
    pub fn new(id: PieceId, width: f64, height: f64, solved_position: Point) -> Self {
        Self {
            id,
            width,
            height,
            position: solved_position,
            rotation: 0.0,
            face: Face::Up,
            solved_position,
            connections: [None; 4],
            connected: BTreeSet::new(),
            group_id: id,
            locked: false,
        }
    }

    /// Attach a mating edge. Used while building a piece set.
    pub fn with_connection(mut self, edge: Edge, connection: Connection) -> Self {
        self.set_connection(edge, connection);
        self
    }

    pub(crate) fn set_connection(&mut self, edge: Edge, connection: Connection) {
        self.connections[edge.index()] = Some(connection);
    }

    /// Reference position in the assembled image. Never changes.
    pub fn solved_position(&self) -> Point {
        self.solved_position
    }

    pub fn connections(&self) -> &[Option<Connection>; 4] {
        &self.connections
    }

    pub fn connection(&self, edge: Edge) -> Option<&Connection> {
        self.connections[edge.index()].as_ref()
    }

    /// Find the slot naming `other` as its mating piece.
    pub fn connection_to(&self, other: PieceId) -> Option<(Edge, &Connection)> {
        Edge::ALL.into_iter().find_map(|edge| {
            self.connection(edge)
                .filter(|c| c.piece == other)
                .map(|c| (edge, c))
        })
    }

    /// Pieces this one is joined with.
    pub fn connected_pieces(&self) -> &BTreeSet<PieceId> {
        &self.connected
    }

    pub(crate) fn connected_mut(&mut self) -> &mut BTreeSet<PieceId> {
        &mut self.connected
    }

    pub fn group_id(&self) -> PieceId {
        self.group_id
    }

    pub(crate) fn set_group_id(&mut self, group_id: PieceId) {
        self.group_id = group_id;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_face_up(&self) -> bool {
        self.face == Face::Up
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.position + self.size() * 0.5
    }

    /// Move the piece so its center lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        self.position = center - self.size() * 0.5;
    }

    pub fn solved_center(&self) -> Point {
        self.solved_position + self.size() * 0.5
    }

    /// Axis-aligned bounds of the rotated piece.
    pub fn bounds(&self) -> Rect {
        let (half_w, half_h) = if is_quarter_turn_odd(self.rotation) {
            (self.height / 2.0, self.width / 2.0)
        } else {
            (self.width / 2.0, self.height / 2.0)
        };
        let c = self.center();
        Rect::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Distance between the current and solved positions.
    pub fn distance_from_solved(&self) -> f64 {
        (self.position - self.solved_position).hypot()
    }
}

/// Serialize a piece list (for persistence hosts).
pub fn pieces_to_json(pieces: &[Piece]) -> EngineResult<String> {
    Ok(serde_json::to_string(pieces)?)
}

/// Deserialize a piece list written by [`pieces_to_json`].
pub fn pieces_from_json(json: &str) -> EngineResult<Vec<Piece>> {
    Ok(serde_json::from_str(json)?)
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest turn from `current` to `target`, in `(-180, 180]`.
pub fn angle_delta(target: f64, current: f64) -> f64 {
    let diff = normalize_angle(target - current);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

fn is_quarter_turn_odd(rotation: f64) -> bool {
    let quarters = (normalize_angle(rotation) / ROTATION_STEP_DEG).round() as i64;
    quarters % 2 == 1
}

/// Rotate a vector by `degrees` (clockwise on a y-down screen).
///
/// Multiples of 90 are exact.
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let normalized = normalize_angle(degrees);
    let quarters = normalized / ROTATION_STEP_DEG;
    if (quarters - quarters.round()).abs() < 1e-9 {
        return match (quarters.round() as i64).rem_euclid(4) {
            0 => v,
            1 => Vec2::new(-v.y, v.x),
            2 => Vec2::new(-v.x, -v.y),
            _ => Vec2::new(v.y, -v.x),
        };
    }
    let (sin, cos) = normalized.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_piece_starts_solved() {
        let piece = Piece::new(3, 40.0, 20.0, Point::new(10.0, 10.0));
        assert_eq!(piece.position, piece.solved_position());
        assert_eq!(piece.group_id(), 3);
        assert!(piece.is_face_up());
        assert!(!piece.is_locked());
        assert_eq!(piece.center(), Point::new(30.0, 20.0));
    }

    #[test]
    fn test_bounds_swap_on_quarter_turn() {
        let mut piece = Piece::new(0, 40.0, 20.0, Point::ZERO);
        assert_eq!(piece.bounds(), Rect::new(0.0, 0.0, 40.0, 20.0));

        piece.rotation = 90.0;
        assert_eq!(piece.bounds(), Rect::new(10.0, -10.0, 30.0, 30.0));
        assert!(piece.contains(Point::new(20.0, -5.0)));
        assert!(!piece.contains(Point::new(2.0, 5.0)));

        piece.rotation = 180.0;
        assert_eq!(piece.bounds(), Rect::new(0.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn test_connection_lookup() {
        let piece = Piece::new(0, 10.0, 10.0, Point::ZERO).with_connection(
            Edge::Right,
            Connection { piece: 1, edge: Edge::Left, polarity: Polarity::Tab },
        );
        let (edge, conn) = piece.connection_to(1).unwrap();
        assert_eq!(edge, Edge::Right);
        assert_eq!(conn.edge, Edge::Left);
        assert!(piece.connection_to(2).is_none());
        assert!(piece.connection(Edge::Top).is_none());
    }

    #[test]
    fn test_edge_and_polarity_opposites() {
        for edge in Edge::ALL {
            assert_eq!(edge.opposite().opposite(), edge);
            assert_ne!(edge.opposite(), edge);
        }
        assert_eq!(Polarity::Tab.opposite(), Polarity::Blank);
        assert_eq!(Face::Down.flipped(), Face::Up);
    }

    #[test]
    fn test_piece_json_keeps_private_state() {
        let mut piece = Piece::new(4, 50.0, 50.0, Point::new(100.0, 0.0)).with_connection(
            Edge::Left,
            Connection { piece: 3, edge: Edge::Right, polarity: Polarity::Blank },
        );
        piece.connected_mut().insert(3);
        piece.set_group_id(3);
        piece.lock();
        piece.face = Face::Down;

        let json = pieces_to_json(std::slice::from_ref(&piece)).unwrap();
        let back = pieces_from_json(&json).unwrap();
        assert_eq!(back, vec![piece]);
    }

    #[test]
    fn test_pieces_from_bad_json() {
        assert!(matches!(
            pieces_from_json("[{\"id\": 1}]"),
            Err(crate::error::EngineError::Serialization(_))
        ));
    }

    #[test]
    fn test_angle_helpers() {
        assert!((normalize_angle(-90.0) - 270.0).abs() < 1e-9);
        assert!((normalize_angle(450.0) - 90.0).abs() < 1e-9);
        assert!((angle_delta(0.0, 270.0) - 90.0).abs() < 1e-9);
        assert!((angle_delta(270.0, 0.0) + 90.0).abs() < 1e-9);
        assert!((angle_delta(10.0, 350.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_vec_quarter_turns_are_exact() {
        let v = Vec2::new(3.0, 1.0);
        assert_eq!(rotate_vec(v, 90.0), Vec2::new(-1.0, 3.0));
        assert_eq!(rotate_vec(v, 180.0), Vec2::new(-3.0, -1.0));
        assert_eq!(rotate_vec(v, 270.0), Vec2::new(1.0, -3.0));
        assert_eq!(rotate_vec(v, 360.0), v);
        let half = rotate_vec(Vec2::new(1.0, 0.0), 45.0);
        assert!((half.x - half.y).abs() < 1e-12);
    }
}
