//! In-memory puzzle source.

use super::{BoxFuture, GeneratedPuzzle, PuzzleSource};
use crate::error::{EngineError, EngineResult};

/// Source that hands out a prepared puzzle, or a canned load failure.
///
/// Useful for tests and for hosts that generate synchronously.
#[derive(Debug, Clone)]
pub struct MemorySource {
    result: Result<GeneratedPuzzle, String>,
}

impl MemorySource {
    pub fn new(puzzle: GeneratedPuzzle) -> Self {
        Self { result: Ok(puzzle) }
    }

    /// A source whose image never loads.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { result: Err(reason.into()) }
    }
}

impl PuzzleSource for MemorySource {
    fn load(&self) -> BoxFuture<'_, EngineResult<GeneratedPuzzle>> {
        Box::pin(async move {
            self.result
                .clone()
                .map_err(EngineError::LoadFailed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PuzzleConfig;
    use crate::grid::build_grid_pieces;

    #[test]
    fn test_memory_source_returns_puzzle() {
        let puzzle = GeneratedPuzzle::new(
            build_grid_pieces(2, 3, 10.0, 10.0, 0),
            PuzzleConfig::new(2, 3, 30.0, 20.0),
        );
        let source = MemorySource::new(puzzle.clone());
        let loaded = pollster::block_on(source.load()).unwrap();
        assert_eq!(loaded, puzzle);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_failing_source() {
        let source = MemorySource::failing("404");
        let result = pollster::block_on(source.load());
        assert!(matches!(result, Err(EngineError::LoadFailed(reason)) if reason == "404"));
    }

    #[test]
    fn test_validate_rejects_wrong_count_and_duplicates() {
        let config = PuzzleConfig::new(2, 2, 20.0, 20.0);
        let short = GeneratedPuzzle::new(build_grid_pieces(1, 2, 10.0, 10.0, 0), config.clone());
        assert!(matches!(short.validate(), Err(EngineError::Config(_))));

        let mut pieces = build_grid_pieces(2, 2, 10.0, 10.0, 0);
        pieces[3].id = 0;
        let dup = GeneratedPuzzle::new(pieces, config);
        assert!(matches!(dup.validate(), Err(EngineError::Config(_))));
    }
}
