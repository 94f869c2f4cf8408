//! Deterministic install-time scramble: scatter, quarter turns and flips.

use crate::config::PuzzleConfig;
use crate::piece::{Face, Piece, ROTATION_STEP_DEG};
use kurbo::{Point, Rect};

/// Share of pieces turned face down when pre-flip is on.
pub const FLIP_CHANCE: f64 = 0.2;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Uniform value in `[0, 1)` for a seed and salt.
pub fn rand_unit(seed: u32, salt: u32) -> f64 {
    let mixed = splitmix32(seed ^ splitmix32(salt));
    f64::from(mixed >> 8) / f64::from(1u32 << 24)
}

pub fn rand_range(seed: u32, salt: u32, min: f64, max: f64) -> f64 {
    min + (max - min) * rand_unit(seed, salt)
}

/// Area pieces are scattered over: the solved bounds grown by half their
/// size on every side.
pub fn scatter_area(solved: Rect) -> Rect {
    solved.inflate(solved.width() / 2.0, solved.height() / 2.0)
}

/// Apply the scramble options of `config` to a freshly generated piece
/// list. The list is reordered when shuffling, which changes draw order.
pub fn scramble_pieces(pieces: &mut Vec<Piece>, config: &PuzzleConfig) {
    let seed = config.seed;
    let solved = pieces
        .iter()
        .map(|p| Rect::from_origin_size(p.solved_position(), (p.width, p.height)))
        .reduce(|a, b| a.union(b));
    let Some(solved) = solved else { return };

    if config.shuffle {
        let area = scatter_area(solved);
        for piece in pieces.iter_mut() {
            let salt = piece.id << 1;
            let max_x = (area.x1 - piece.width).max(area.x0);
            let max_y = (area.y1 - piece.height).max(area.y0);
            piece.position = Point::new(
                rand_range(seed, salt, area.x0, max_x),
                rand_range(seed, salt + 1, area.y0, max_y),
            );
        }
        for i in (1..pieces.len()).rev() {
            let salt = 0xC0DE_u32.wrapping_add(i as u32);
            let j = ((rand_unit(seed, salt) * (i as f64 + 1.0)) as usize).min(i);
            pieces.swap(i, j);
        }
    }

    if config.pre_rotate {
        for piece in pieces.iter_mut() {
            let salt = 0xC001_u32.wrapping_add(piece.id);
            let quarters = ((rand_unit(seed, salt) * 4.0) as u32).min(3);
            piece.rotation = f64::from(quarters) * ROTATION_STEP_DEG;
        }
    }

    if config.pre_flip {
        for piece in pieces.iter_mut() {
            let salt = 0xF11F_5EED_u32.wrapping_add(piece.id);
            if rand_unit(seed, salt) < FLIP_CHANCE {
                piece.face = Face::Down;
            }
        }
    }
}
