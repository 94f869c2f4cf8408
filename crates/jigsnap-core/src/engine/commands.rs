//! Explicit host commands: selection, orientation, view and layout.

use super::PuzzleEngine;
use crate::animation::PieceTransform;
use crate::events::EngineEvent;
use crate::piece::{PieceId, ROTATION_STEP_DEG, rotate_vec};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;

/// Gap between tidied pieces, as a share of the largest piece side.
const TIDY_GAP_RATIO: f64 = 0.25;

impl PuzzleEngine {
    /// Flip the selected piece over. Only loose, unlocked pieces flip.
    pub fn flip_selected(&mut self) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        if self.is_animating() || self.board.group_size(id) != 1 {
            return false;
        }
        let Some(piece) = self.board.get_mut(id) else {
            return false;
        };
        if piece.is_locked() {
            return false;
        }
        piece.face = piece.face.flipped();
        log::debug!("Flipped piece {} {:?}", id, piece.face);
        self.notify_pieces_changed();
        self.notify_progress();
        true
    }

    /// Rotate the group of the selected piece, as a double-tap would.
    pub fn rotate_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.rotate_group(id),
            None => false,
        }
    }

    /// Turn the group of `id` a quarter turn about its centroid.
    ///
    /// Face-down members are flipped face up in place of turning their own
    /// orientation; their cells still orbit the centroid. Refused while an
    /// animation or drag is running, or if any member is locked.
    pub fn rotate_group(&mut self, id: PieceId) -> bool {
        if self.is_animating() || self.gesture.is_dragging() {
            return false;
        }
        let members = self.board.group_of(id);
        let pieces: Vec<_> = members.iter().filter_map(|&m| self.board.get(m)).collect();
        if pieces.is_empty() || pieces.iter().any(|p| p.is_locked()) {
            return false;
        }

        let sum = pieces
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.center().to_vec2());
        let centroid = (sum / pieces.len() as f64).to_point();

        let mut flipped = Vec::new();
        let targets: HashMap<PieceId, PieceTransform> = pieces
            .iter()
            .map(|p| {
                let center = centroid + rotate_vec(p.center() - centroid, ROTATION_STEP_DEG);
                let rotation = if p.is_face_up() {
                    p.rotation + ROTATION_STEP_DEG
                } else {
                    flipped.push(p.id);
                    p.rotation
                };
                let target = PieceTransform {
                    position: center - p.size() * 0.5,
                    rotation,
                };
                (p.id, target)
            })
            .collect();

        for &piece_id in &flipped {
            if let Some(piece) = self.board.get_mut(piece_id) {
                piece.face = piece.face.flipped();
            }
        }
        log::debug!(
            "Rotating group of piece {} ({} pieces, {} flipped)",
            id,
            members.len(),
            flipped.len()
        );
        let duration = self.config.rotate_duration_ms;
        self.animate_to(
            targets,
            None,
            duration,
            Some(Box::new(move |engine: &mut PuzzleEngine| {
                engine.check_lock(&members);
                engine.notify_pieces_changed();
                engine.notify_progress();
            })),
        );
        true
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.emit(EngineEvent::Selected(None));
        }
    }

    /// Drop any animation and gesture, then fit the camera to the pieces
    /// immediately.
    pub fn reset_view(&mut self) {
        self.finish_animation_now();
        self.reset_interaction();
        self.fit_camera_now();
        log::debug!("View reset");
    }

    /// Animate the camera so every piece is visible.
    pub fn fit_view_to_pieces(&mut self) {
        let Some(bounds) = self.board.bounds() else {
            return;
        };
        let target = self.fitted_camera(bounds);
        let duration = self.config.fit_duration_ms;
        self.animate_to(HashMap::new(), Some(target), duration, None);
    }

    /// Gather loose pieces into a grid below the assembled work.
    ///
    /// Pieces in groups of two or more, and locked pieces, stay put. The
    /// grid starts under the bounds of those pieces, or under the solved
    /// area when nothing is assembled yet.
    pub fn tidy_up(&mut self) -> bool {
        if self.gesture.is_dragging() {
            return false;
        }
        let mut loose = Vec::new();
        let mut anchored = Vec::new();
        for piece in self.board.pieces_ordered() {
            if !piece.is_locked() && self.board.group_size(piece.id) == 1 {
                loose.push(piece);
            } else {
                anchored.push(piece.id);
            }
        }
        if loose.is_empty() {
            return false;
        }
        loose.sort_by_key(|p| p.id);

        let anchor = self
            .board
            .bounds_of(&anchored)
            .or_else(|| self.board.solved_bounds())
            .unwrap_or(Rect::ZERO);
        let cell = loose
            .iter()
            .map(|p| p.width.max(p.height))
            .fold(0.0_f64, f64::max);
        let gap = cell * TIDY_GAP_RATIO;
        let pitch = cell + gap;
        let cols = ((anchor.width() + gap) / pitch)
            .floor()
            .max((loose.len() as f64).sqrt().ceil())
            .max(1.0) as usize;

        let targets: HashMap<PieceId, PieceTransform> = loose
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (row, col) = (i / cols, i % cols);
                let center = Point::new(
                    anchor.x0 + col as f64 * pitch + cell / 2.0,
                    anchor.y1 + gap + row as f64 * pitch + cell / 2.0,
                );
                let target = PieceTransform {
                    position: center - p.size() * 0.5,
                    rotation: p.rotation,
                };
                (p.id, target)
            })
            .collect();

        log::debug!("Tidying {} loose pieces into {} columns", targets.len(), cols);
        let duration = self.config.tidy_duration_ms;
        self.animate_to(
            targets,
            None,
            duration,
            Some(Box::new(|engine: &mut PuzzleEngine| engine.notify_pieces_changed())),
        );
        true
    }
}
