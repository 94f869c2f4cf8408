//! Connectivity metadata for a rectangular rows x cols cut.
//!
//! Only the metadata half of piece generation lives here: ids, solved
//! positions and mating slots. Edge curves and image slicing belong to the
//! generator that feeds the engine.

use crate::piece::{Connection, Edge, Piece, PieceId, Polarity};
use crate::scramble::rand_unit;
use kurbo::Point;

/// Neighbor of `id` across `edge` in a row-major grid.
pub fn neighbor_id(id: PieceId, cols: usize, rows: usize, edge: Edge) -> Option<PieceId> {
    let id = id as usize;
    let col = id % cols;
    let row = id / cols;
    let neighbor = match edge {
        Edge::Top if row > 0 => id - cols,
        Edge::Right if col + 1 < cols => id + 1,
        Edge::Bottom if row + 1 < rows => id + cols,
        Edge::Left if col > 0 => id - 1,
        _ => return None,
    };
    PieceId::try_from(neighbor).ok()
}

/// Build `rows * cols` pieces of `piece_width x piece_height`, solved on the
/// grid, with every interior edge carrying a mating slot.
///
/// Joint polarity is derived from `seed`, and the two sides of a joint are
/// always opposite.
pub fn build_grid_pieces(
    rows: usize,
    cols: usize,
    piece_width: f64,
    piece_height: f64,
    seed: u32,
) -> Vec<Piece> {
    let total = rows * cols;
    let mut pieces: Vec<Piece> = (0..total)
        .map(|index| {
            let col = (index % cols) as f64;
            let row = (index / cols) as f64;
            Piece::new(
                index as PieceId,
                piece_width,
                piece_height,
                Point::new(col * piece_width, row * piece_height),
            )
        })
        .collect();

    for index in 0..total {
        let id = index as PieceId;
        for edge in [Edge::Right, Edge::Bottom] {
            let Some(neighbor) = neighbor_id(id, cols, rows, edge) else {
                continue;
            };
            let salt = (id << 1) | u32::from(edge == Edge::Bottom);
            let polarity = if rand_unit(seed, salt) < 0.5 {
                Polarity::Tab
            } else {
                Polarity::Blank
            };
            let own = Connection { piece: neighbor, edge: edge.opposite(), polarity };
            let theirs = Connection { piece: id, edge, polarity: polarity.opposite() };
            pieces[index].set_connection(edge, own);
            pieces[neighbor as usize].set_connection(edge.opposite(), theirs);
        }
    }
    pieces
}
