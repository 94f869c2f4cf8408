//! The piece arena and draw order for one puzzle session.

use crate::piece::{Piece, PieceId};
use kurbo::{Rect, Vec2};
use std::collections::HashMap;

/// All pieces of a puzzle, keyed by id, plus their draw order.
///
/// Pieces never reference each other directly; connectivity is stored as
/// id sets on each piece and resolved through this arena.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pieces: HashMap<PieceId, Piece>,
    /// Draw order of pieces (back to front).
    z_order: Vec<PieceId>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from a piece list. List order becomes draw order.
    pub fn from_pieces(pieces: Vec<Piece>) -> Self {
        let mut board = Self::new();
        for piece in pieces {
            board.add_piece(piece);
        }
        board
    }

    /// Add a piece on top. A piece with the same id is replaced.
    pub fn add_piece(&mut self, piece: Piece) {
        let id = piece.id;
        self.z_order.retain(|&other| other != id);
        self.z_order.push(id);
        self.pieces.insert(id, piece);
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
        self.z_order.clear();
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.pieces.contains_key(&id)
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    /// Draw order, back to front.
    pub fn z_order(&self) -> &[PieceId] {
        &self.z_order
    }

    /// Pieces in draw order (back to front).
    pub fn pieces_ordered(&self) -> impl Iterator<Item = &Piece> {
        self.z_order.iter().filter_map(|id| self.pieces.get(id))
    }

    /// Pieces front to back, the order used for hit-testing.
    pub fn pieces_top_down(&self) -> impl Iterator<Item = &Piece> {
        self.z_order.iter().rev().filter_map(|id| self.pieces.get(id))
    }

    pub fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.values_mut()
    }

    /// Copy of every piece, in draw order.
    pub fn snapshot(&self) -> Vec<Piece> {
        self.pieces_ordered().cloned().collect()
    }

    /// Move `ids` to the top of the draw order, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[PieceId]) {
        let (mut raised, mut rest): (Vec<PieceId>, Vec<PieceId>) =
            self.z_order.iter().copied().partition(|id| ids.contains(id));
        rest.append(&mut raised);
        self.z_order = rest;
    }

    /// Translate the given pieces rigidly.
    pub fn translate(&mut self, ids: &[PieceId], delta: Vec2) {
        for id in ids {
            if let Some(piece) = self.pieces.get_mut(id) {
                piece.position += delta;
            }
        }
    }

    /// Bounding box of every piece at its current transform.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.pieces.values().map(Piece::bounds))
    }

    /// Bounding box of the given pieces.
    pub fn bounds_of(&self, ids: &[PieceId]) -> Option<Rect> {
        union_bounds(ids.iter().filter_map(|id| self.pieces.get(id)).map(Piece::bounds))
    }

    /// Bounding box of the assembled image.
    pub fn solved_bounds(&self) -> Option<Rect> {
        union_bounds(self.pieces.values().map(|p| {
            Rect::from_origin_size(p.solved_position(), (p.width, p.height))
        }))
    }
}

fn union_bounds(rects: impl Iterator<Item = Rect>) -> Option<Rect> {
    rects.fold(None, |acc, r| Some(match acc {
        Some(acc) => acc.union(r),
        None => r,
    }))
}
