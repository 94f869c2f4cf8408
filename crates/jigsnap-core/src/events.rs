//! Notifications from the engine to its host.

use crate::piece::{Piece, PieceId};

/// Something that happened during an interaction, queued on the engine
/// until the host drains it.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A new puzzle (or restored piece list) was installed.
    PuzzleLoaded { pieces: usize },
    /// Selection changed.
    Selected(Option<PieceId>),
    /// A dragged group snapped onto a neighbor.
    Snapped {
        dragged: PieceId,
        target: PieceId,
        distance: f64,
    },
    /// A group reached its solved placement and can no longer move.
    GroupLocked(Vec<PieceId>),
    /// Every piece is connected and normalized into place.
    Completed,
    /// An animation reached its target.
    AnimationFinished,
}

pub(crate) type ProgressCallback = Box<dyn FnMut(usize, usize)>;
pub(crate) type PiecesChangedCallback = Box<dyn FnMut(&[Piece])>;

/// Registered host callbacks.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub progress: Option<ProgressCallback>,
    pub pieces_changed: Option<PiecesChangedCallback>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("progress", &self.progress.is_some())
            .field("pieces_changed", &self.pieces_changed.is_some())
            .finish()
    }
}
