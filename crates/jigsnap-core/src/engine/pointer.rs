//! Pointer and wheel handling: the gesture state machine, drops and snaps.

use super::PuzzleEngine;
use crate::animation::PieceTransform;
use crate::camera::Pinch;
use crate::config::LockPolicy;
use crate::events::EngineEvent;
use crate::gesture::{DragState, Gesture, Grab, hit_test};
use crate::input::{PointerEvent, PointerId, PointerPhase, WheelEvent};
use crate::piece::{Face, Piece, PieceId, angle_delta};
use crate::snap::{SnapCandidate, SnapOptions, find_group_snap_by};
use kurbo::Point;
use std::collections::HashMap;

/// Rotation (degrees) still treated as upright when locking.
const UPRIGHT_TOLERANCE: f64 = 0.5;

impl PuzzleEngine {
    /// Feed one raw pointer event.
    ///
    /// Moves are only recorded here; the gesture reads the latest position
    /// on the next `update`. Releases flush that position first so the drop
    /// happens exactly where the pointer left.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.phase {
            PointerPhase::Down => {
                self.pointers.handle(&event);
                self.pointer_down(event);
            }
            PointerPhase::Move => {
                self.pointers.handle(&event);
                if self.gesture.involves(event.pointer_id) {
                    self.move_pending = true;
                }
            }
            PointerPhase::Up => {
                self.pointers.handle(&PointerEvent { phase: PointerPhase::Move, ..event });
                if self.gesture.involves(event.pointer_id) {
                    self.move_pending = false;
                    self.process_move();
                    self.pointer_up(event);
                }
                self.pointers.handle(&event);
            }
            PointerPhase::Cancel => {
                self.pointers.handle(&event);
                if self.gesture.involves(event.pointer_id) {
                    self.pointer_cancel();
                }
            }
        }
    }

    /// Zoom around the wheel position. Ignored while an animation drives
    /// the camera.
    pub fn handle_wheel(&mut self, event: WheelEvent) {
        if self.camera_is_animating() || event.delta.y == 0.0 {
            return;
        }
        let factor = (-event.delta.y * self.config.wheel_zoom_sensitivity).exp();
        self.camera.zoom_at(event.position, factor);
    }

    fn camera_is_animating(&self) -> bool {
        self.animation
            .as_ref()
            .is_some_and(|active| active.animation.animates_camera())
    }

    fn pointer_down(&mut self, event: PointerEvent) {
        if self.pointers.active_count() >= 2 {
            self.begin_pinch();
            return;
        }

        let world = self.camera.screen_to_world(event.position);
        // A press on a piece never pans, even while an animation keeps it
        // from being dragged.
        let grab = hit_test(&self.board, world).and_then(|piece| {
            let origin = self.board.get(piece)?.position;
            Some(Grab { piece, offset: world - origin })
        });
        if let Some(grab) = grab {
            self.select(grab.piece);
        }
        self.gesture = Gesture::Pending {
            pointer: event.pointer_id,
            grab,
            is_touch: event.is_touch,
        };
    }

    /// Second finger down: abandon any single-pointer gesture and zoom.
    /// A drag in progress is put back where it started.
    fn begin_pinch(&mut self) {
        if let Gesture::Dragging(drag) = std::mem::take(&mut self.gesture) {
            log::debug!("Pinch cancels drag of piece {}", drag.piece);
            drag.revert(&mut self.board);
            self.notify_pieces_changed();
        }
        self.taps.reset();
        self.move_pending = false;

        let pinch = self.pointers.first_pair().and_then(|(a, b)| {
            let pa = self.pointers.position(a)?;
            let pb = self.pointers.position(b)?;
            Pinch::begin(&self.camera, pa, pb).map(|pinch| ((a, b), pinch))
        });
        self.gesture = match pinch {
            Some((pointers, pinch)) => {
                log::debug!("Pinch started with pointers {:?}", pointers);
                Gesture::Pinching { pointers, pinch }
            }
            None => Gesture::Idle,
        };
    }

    /// Apply the latest pointer positions to the active gesture.
    pub(super) fn process_move(&mut self) {
        self.promote_pending();
        match &self.gesture {
            Gesture::Idle | Gesture::Pending { .. } => {}
            Gesture::Dragging(drag) => {
                if let Some(screen) = self.pointers.position(drag.pointer) {
                    let world = self.camera.screen_to_world(screen);
                    drag.apply(&mut self.board, world);
                }
            }
            Gesture::Panning {
                pointer,
                start_screen,
                start_offset,
            } => {
                if self.camera_is_animating() {
                    return;
                }
                if let Some(screen) = self.pointers.position(*pointer) {
                    self.camera.offset = *start_offset + (screen - *start_screen);
                }
            }
            Gesture::Pinching { pointers, pinch } => {
                if self.camera_is_animating() {
                    return;
                }
                if let (Some(a), Some(b)) = (self.pointers.position(pointers.0), self.pointers.position(pointers.1)) {
                    pinch.apply(&mut self.camera, a, b);
                }
            }
        }
    }

    /// Turn a pending press into a drag or a pan once it has travelled
    /// past the drag threshold.
    fn promote_pending(&mut self) {
        let Gesture::Pending { pointer, grab, is_touch } = self.gesture else {
            return;
        };
        let Some(tracked) = self.pointers.get(pointer).copied() else {
            return;
        };
        if tracked.displacement() <= self.config.drag_threshold(is_touch) {
            return;
        }
        match grab {
            Some(grab) => {
                if self.is_animating() {
                    return;
                }
                let drag = DragState::new(&self.board, pointer, grab);
                let blocked = drag
                    .members
                    .iter()
                    .any(|&id| self.board.get(id).is_some_and(|p| p.is_locked()));
                if blocked {
                    return;
                }
                log::debug!("Dragging group of piece {} ({} pieces)", grab.piece, drag.members.len());
                self.board.bring_to_front(&drag.members);
                self.gesture = Gesture::Dragging(drag);
            }
            None => {
                log::debug!("Panning");
                self.gesture = Gesture::Panning {
                    pointer,
                    start_screen: tracked.start,
                    start_offset: self.camera.offset,
                };
            }
        }
    }

    fn pointer_up(&mut self, event: PointerEvent) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Pending { grab, .. } => {
                let tapped_group = grab.and_then(|grab| self.board.get(grab.piece)).map(|p| p.group_id());
                let double = self.taps.register(
                    self.clock_ms,
                    event.position,
                    tapped_group,
                    self.config.double_tap_ms,
                    self.config.double_tap_distance,
                );
                match grab {
                    Some(grab) if double => {
                        self.rotate_group(grab.piece);
                    }
                    Some(_) => {}
                    None => {
                        if !double {
                            self.clear_selection();
                        }
                    }
                }
            }
            Gesture::Dragging(drag) => {
                self.taps.reset();
                self.finish_drag(drag);
            }
            Gesture::Panning { .. } | Gesture::Pinching { .. } => self.taps.reset(),
            Gesture::Idle => {}
        }
        self.notify_progress();
    }

    /// The platform took the pointer away. The gesture ends where it is,
    /// without snapping.
    fn pointer_cancel(&mut self) {
        self.taps.reset();
        self.move_pending = false;
        if let Gesture::Dragging(drag) = std::mem::take(&mut self.gesture) {
            log::debug!("Drag of piece {} cancelled", drag.piece);
            self.notify_pieces_changed();
        }
    }

    /// Snap the dropped group onto its best neighbor, then check for
    /// locking and completion.
    fn finish_drag(&mut self, drag: DragState) {
        let options = SnapOptions::from(&self.config);
        let accept = |candidate: &SnapCandidate| self.snap_keeps_locks(&drag.members, candidate);
        match find_group_snap_by(&self.board, &drag.members, options, &accept) {
            Some(candidate) => {
                if let Some(current) = self.board.get(candidate.dragged).map(|p| p.position) {
                    self.board.translate(&drag.members, candidate.position - current);
                }
                self.board.connect(candidate.dragged, candidate.target);
                log::info!(
                    "Snapped piece {} to {} (distance {:.1})",
                    candidate.dragged,
                    candidate.target,
                    candidate.distance
                );
                self.emit(EngineEvent::Snapped {
                    dragged: candidate.dragged,
                    target: candidate.target,
                    distance: candidate.distance,
                });
            }
            None => log::debug!("Dropped group of piece {} without a snap", drag.piece),
        }

        let group = self.board.group_of(drag.piece);
        self.check_lock(&group);
        self.notify_pieces_changed();

        if self.board.is_complete() && !self.completed {
            self.complete();
        }
    }

    /// Joining a locked group is only allowed when the moved pieces would
    /// land where they lock too.
    fn snap_keeps_locks(&self, members: &[PieceId], candidate: &SnapCandidate) -> bool {
        if !self.board.get(candidate.target).is_some_and(|p| p.is_locked()) {
            return true;
        }
        let Some(anchor) = self.board.get(candidate.dragged) else {
            return false;
        };
        let delta = candidate.position - anchor.position;
        members.iter().all(|&id| {
            self.board
                .get(id)
                .is_some_and(|p| self.lockable_at(p, p.position + delta))
        })
    }

    /// Whether `piece`, placed at `position`, counts as solved under the
    /// configured lock policy.
    fn lockable_at(&self, piece: &Piece, position: Point) -> bool {
        piece.face == Face::Up
            && (position - piece.solved_position()).hypot() <= self.config.lock_tolerance
            && match self.config.lock_policy {
                LockPolicy::PositionOnly => true,
                LockPolicy::PositionAndUpright => angle_delta(0.0, piece.rotation).abs() < UPRIGHT_TOLERANCE,
            }
    }

    /// Lock `group` if every member sits on its solved position (and is
    /// upright, depending on policy). Members are snapped exactly into place.
    pub(super) fn check_lock(&mut self, group: &[PieceId]) -> bool {
        let policy = self.config.lock_policy;
        let pieces: Vec<_> = group.iter().filter_map(|&id| self.board.get(id)).collect();
        if pieces.is_empty() || pieces.len() != group.len() || pieces.iter().all(|p| p.is_locked()) {
            return false;
        }
        if !pieces.iter().all(|p| self.lockable_at(p, p.position)) {
            return false;
        }

        for &id in group {
            if let Some(piece) = self.board.get_mut(id) {
                piece.position = piece.solved_position();
                if policy == LockPolicy::PositionAndUpright {
                    piece.rotation = 0.0;
                }
                piece.lock();
            }
        }
        let mut locked = group.to_vec();
        locked.sort_unstable();
        log::info!("Locked group of {} pieces", locked.len());
        self.emit(EngineEvent::GroupLocked(locked));
        true
    }

    /// Every piece is joined: animate the whole picture into its solved
    /// layout and lock it.
    fn complete(&mut self) {
        log::info!("Puzzle complete ({} pieces)", self.board.len());
        let targets: HashMap<PieceId, PieceTransform> = self
            .board
            .pieces_ordered()
            .filter(|p| !p.is_locked())
            .map(|p| {
                let target = PieceTransform {
                    position: p.solved_position(),
                    rotation: 0.0,
                };
                (p.id, target)
            })
            .collect();
        let camera = self.board.solved_bounds().map(|bounds| self.fitted_camera(bounds));
        let duration = self.config.complete_duration_ms;
        self.animate_to(targets, camera, duration, Some(Box::new(PuzzleEngine::finish_completion)));
    }

    fn finish_completion(&mut self) {
        for piece in self.board.pieces_mut() {
            piece.position = piece.solved_position();
            piece.rotation = 0.0;
            piece.face = Face::Up;
            piece.lock();
        }
        self.completed = true;
        self.emit(EngineEvent::Completed);
        self.notify_pieces_changed();
        self.notify_progress();
    }

    fn select(&mut self, piece: PieceId) {
        if self.selected != Some(piece) {
            self.selected = Some(piece);
            self.emit(EngineEvent::Selected(Some(piece)));
        }
    }

    /// Pointer currently driving a single-pointer gesture.
    pub fn active_pointer(&self) -> Option<PointerId> {
        match &self.gesture {
            Gesture::Pending { pointer, .. } | Gesture::Panning { pointer, .. } => Some(*pointer),
            Gesture::Dragging(drag) => Some(drag.pointer),
            Gesture::Idle | Gesture::Pinching { .. } => None,
        }
    }
}
