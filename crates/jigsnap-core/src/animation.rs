//! Timed interpolation of piece transforms and the camera.

use crate::board::Board;
use crate::camera::Camera;
use crate::piece::{Piece, PieceId, angle_delta, normalize_angle};
use kurbo::Point;
use std::collections::HashMap;

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Position and rotation of one piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceTransform {
    pub position: Point,
    /// Degrees.
    pub rotation: f64,
}

impl PieceTransform {
    pub fn of(piece: &Piece) -> Self {
        Self {
            position: piece.position,
            rotation: piece.rotation,
        }
    }

    /// Blend towards `target`. Rotation takes the shortest way round.
    pub fn lerp(&self, target: &PieceTransform, t: f64) -> PieceTransform {
        PieceTransform {
            position: self.position.lerp(target.position, t),
            rotation: normalize_angle(self.rotation + angle_delta(target.rotation, self.rotation) * t),
        }
    }
}

/// One transition from a start snapshot to a target state.
#[derive(Debug, Clone)]
pub struct Animation {
    start: HashMap<PieceId, PieceTransform>,
    target: HashMap<PieceId, PieceTransform>,
    camera_start: Camera,
    camera_target: Option<Camera>,
    started_at: f64,
    duration: f64,
}

impl Animation {
    /// Snapshot the current transforms of every targeted piece and the camera.
    ///
    /// Targets for unknown pieces are dropped.
    pub fn new(
        board: &Board,
        camera: &Camera,
        target: HashMap<PieceId, PieceTransform>,
        camera_target: Option<Camera>,
        now_ms: f64,
        duration_ms: f64,
    ) -> Self {
        let target: HashMap<PieceId, PieceTransform> = target
            .into_iter()
            .filter(|(id, _)| board.contains(*id))
            .collect();
        let start = target
            .keys()
            .filter_map(|&id| board.get(id).map(|p| (id, PieceTransform::of(p))))
            .collect();
        Self {
            start,
            target,
            camera_start: *camera,
            camera_target,
            started_at: now_ms,
            duration: duration_ms.max(0.0),
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    pub fn animates_camera(&self) -> bool {
        self.camera_target.is_some()
    }

    pub fn animates_piece(&self, id: PieceId) -> bool {
        self.target.contains_key(&id)
    }

    /// Write the interpolated state for `now_ms`. Returns true once the
    /// target has been reached, at which point values are exact.
    pub fn apply(&self, board: &mut Board, camera: &mut Camera, now_ms: f64) -> bool {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            self.apply_target(board, camera);
            return true;
        }
        let eased = ease_in_out_cubic(progress);
        for (id, target) in &self.target {
            let (Some(start), Some(piece)) = (self.start.get(id), board.get_mut(*id)) else {
                continue;
            };
            let current = start.lerp(target, eased);
            piece.position = current.position;
            piece.rotation = current.rotation;
        }
        if let Some(target) = &self.camera_target {
            *camera = self.camera_start.lerp(target, eased);
        }
        false
    }

    /// Jump straight to the target state.
    pub fn apply_target(&self, board: &mut Board, camera: &mut Camera) {
        for (id, target) in &self.target {
            if let Some(piece) = board.get_mut(*id) {
                piece.position = target.position;
                piece.rotation = normalize_angle(target.rotation);
            }
        }
        if let Some(target) = &self.camera_target {
            *camera = *target;
        }
    }
}
