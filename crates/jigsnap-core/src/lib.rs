//! jigsnap Core Library
//!
//! Platform-agnostic piece-interaction engine for a jigsaw puzzle: piece
//! model, grouping, snap detection, camera, gestures and animation.

pub mod animation;
pub mod board;
pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod gesture;
pub mod grid;
pub mod group;
pub mod input;
pub mod piece;
pub mod scheduler;
pub mod scramble;
pub mod snap;
pub mod source;

pub use animation::{Animation, PieceTransform, ease_in_out_cubic};
pub use board::Board;
pub use camera::{Camera, Pinch};
pub use config::{EngineConfig, LockPolicy, PuzzleConfig};
pub use engine::{AnimationDone, LoadTicket, PuzzleEngine};
pub use error::{EngineError, EngineResult};
pub use events::EngineEvent;
pub use gesture::{DragState, Gesture, Grab, hit_test};
pub use grid::build_grid_pieces;
pub use input::{PointerEvent, PointerId, PointerPhase, WheelEvent};
pub use piece::{Connection, Edge, Face, Piece, PieceId, Polarity, pieces_from_json, pieces_to_json};
pub use scheduler::FixedStep;
pub use snap::{
    SnapCandidate, SnapOptions, find_group_snap, find_group_snap_by, find_snap, find_snap_by,
};
pub use source::{GeneratedPuzzle, MemorySource, PuzzleSource};
