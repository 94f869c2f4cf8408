//! Raw pointer input: event types, active pointer tracking and tap timing.

use crate::piece::PieceId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Host-assigned pointer identifier (mouse, finger or pen).
pub type PointerId = u32;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
    pub pointer_id: PointerId,
    pub is_touch: bool,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, pointer_id: PointerId, position: Point, is_touch: bool) -> Self {
        Self { phase, position, pointer_id, is_touch }
    }

    /// Mouse press (pointer 0).
    pub fn mouse_down(position: Point) -> Self {
        Self::new(PointerPhase::Down, 0, position, false)
    }

    pub fn mouse_move(position: Point) -> Self {
        Self::new(PointerPhase::Move, 0, position, false)
    }

    pub fn mouse_up(position: Point) -> Self {
        Self::new(PointerPhase::Up, 0, position, false)
    }

    pub fn touch(phase: PointerPhase, pointer_id: PointerId, position: Point) -> Self {
        Self::new(phase, pointer_id, position, true)
    }
}

/// Wheel or trackpad scroll, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: Vec2,
}

/// A pointer that is currently down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPointer {
    /// Where the pointer went down.
    pub start: Point,
    /// Latest known position.
    pub position: Point,
    pub is_touch: bool,
}

impl TrackedPointer {
    /// Screen distance travelled since the pointer went down.
    pub fn displacement(&self) -> f64 {
        self.start.distance(self.position)
    }
}

/// Tracks every pointer that is currently down.
///
/// Moves only overwrite the latest position, so consumers always read the
/// true current location no matter how many events were coalesced.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pointers: BTreeMap<PointerId, TrackedPointer>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event. Moves of pointers that are not down are ignored.
    pub fn handle(&mut self, event: &PointerEvent) {
        match event.phase {
            PointerPhase::Down => {
                self.pointers.insert(
                    event.pointer_id,
                    TrackedPointer {
                        start: event.position,
                        position: event.position,
                        is_touch: event.is_touch,
                    },
                );
            }
            PointerPhase::Move => {
                if let Some(pointer) = self.pointers.get_mut(&event.pointer_id) {
                    pointer.position = event.position;
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                self.pointers.remove(&event.pointer_id);
            }
        }
    }

    pub fn get(&self, id: PointerId) -> Option<&TrackedPointer> {
        self.pointers.get(&id)
    }

    pub fn position(&self, id: PointerId) -> Option<Point> {
        self.pointers.get(&id).map(|p| p.position)
    }

    pub fn active_count(&self) -> usize {
        self.pointers.len()
    }

    /// The two lowest pointer ids that are down, if at least two are.
    pub fn first_pair(&self) -> Option<(PointerId, PointerId)> {
        let mut ids = self.pointers.keys().copied();
        Some((ids.next()?, ids.next()?))
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

/// Detects two taps close in time and space.
#[derive(Debug, Clone, Default)]
pub struct TapDetector {
    last_tap: Option<(f64, Point, Option<PieceId>)>,
}

impl TapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tap at `time_ms` on `target` (a group id, or `None` for
    /// empty space). Returns true when it completes a double-tap; both taps
    /// must hit the same target.
    pub fn register(
        &mut self,
        time_ms: f64,
        position: Point,
        target: Option<PieceId>,
        max_interval_ms: f64,
        max_distance: f64,
    ) -> bool {
        if let Some((last_time, last_pos, last_target)) = self.last_tap {
            let elapsed = time_ms - last_time;
            if elapsed <= max_interval_ms && position.distance(last_pos) <= max_distance && target == last_target {
                // Reset so a third tap starts a new pair
                self.last_tap = None;
                return true;
            }
        }
        self.last_tap = Some((time_ms, position, target));
        false
    }

    pub fn reset(&mut self) {
        self.last_tap = None;
    }
}
