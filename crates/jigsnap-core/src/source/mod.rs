//! Puzzle sources: where freshly generated piece sets come from.

mod memory;

pub use memory::MemorySource;

use crate::config::PuzzleConfig;
use crate::error::{EngineError, EngineResult};
use crate::piece::Piece;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations. Not `Send`: the engine is driven
/// from a single thread.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Output of the external generator: pieces with connectivity metadata and
/// the layout they were cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPuzzle {
    pub pieces: Vec<Piece>,
    pub config: PuzzleConfig,
}

impl GeneratedPuzzle {
    pub fn new(pieces: Vec<Piece>, config: PuzzleConfig) -> Self {
        Self { pieces, config }
    }

    /// Check the piece set against its layout.
    pub fn validate(&self) -> EngineResult<()> {
        self.config.validate()?;
        if self.pieces.len() != self.config.piece_count() {
            return Err(EngineError::Config(format!(
                "expected {} pieces for a {}x{} grid, got {}",
                self.config.piece_count(),
                self.config.rows,
                self.config.cols,
                self.pieces.len()
            )));
        }
        let mut seen = HashSet::new();
        for piece in &self.pieces {
            if !seen.insert(piece.id) {
                return Err(EngineError::Config(format!("duplicate piece id {}", piece.id)));
            }
        }
        Ok(())
    }
}

/// Loads a source image and turns it into a piece set.
///
/// Implementations wrap the image fetch and the generator; a failed image
/// load surfaces as [`EngineError::LoadFailed`].
pub trait PuzzleSource {
    fn load(&self) -> BoxFuture<'_, EngineResult<GeneratedPuzzle>>;
}
