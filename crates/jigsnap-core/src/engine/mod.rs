//! The piece-interaction engine.
//!
//! `PuzzleEngine` owns the board and the camera for one puzzle session and
//! is their only writer. Hosts feed it pointer and wheel events, drive it
//! with [`PuzzleEngine::frame`] (or [`PuzzleEngine::update`] directly) and
//! read state back through accessors and callbacks.

mod commands;
mod pointer;

use crate::animation::{Animation, PieceTransform};
use crate::board::Board;
use crate::camera::Camera;
use crate::config::{EngineConfig, PuzzleConfig};
use crate::error::{EngineError, EngineResult};
use crate::events::{Callbacks, EngineEvent};
use crate::gesture::Gesture;
use crate::input::{PointerTracker, TapDetector};
use crate::piece::{Piece, PieceId};
use crate::scheduler::FixedStep;
use crate::scramble::scramble_pieces;
use crate::source::{GeneratedPuzzle, PuzzleSource};
use kurbo::Size;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Runs once when an animation lands (or is finished early).
pub type AnimationDone = Box<dyn FnOnce(&mut PuzzleEngine)>;
type RenderCallback = Box<dyn FnMut(&PuzzleEngine)>;

/// Default viewport until the host reports its size.
const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 800.0);

/// An animation in flight plus what to do when it lands.
struct ActiveAnimation {
    animation: Animation,
    on_complete: Option<AnimationDone>,
}

impl std::fmt::Debug for ActiveAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveAnimation")
            .field("animation", &self.animation)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Handle for one pending puzzle load. Only the newest ticket installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Interaction engine for one puzzle session.
pub struct PuzzleEngine {
    config: EngineConfig,
    session_id: Uuid,
    board: Board,
    puzzle: Option<PuzzleConfig>,
    camera: Camera,
    viewport: Size,
    clock_ms: f64,
    scheduler: FixedStep,
    pointers: PointerTracker,
    taps: TapDetector,
    gesture: Gesture,
    move_pending: bool,
    selected: Option<PieceId>,
    animation: Option<ActiveAnimation>,
    load_generation: u64,
    completed: bool,
    events: Vec<EngineEvent>,
    callbacks: Callbacks,
    render: Option<RenderCallback>,
}

impl std::fmt::Debug for PuzzleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleEngine")
            .field("session_id", &self.session_id)
            .field("pieces", &self.board.len())
            .field("camera", &self.camera)
            .field("gesture", &self.gesture)
            .field("selected", &self.selected)
            .field("animation", &self.animation)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl PuzzleEngine {
    /// Create an empty engine. Fails if the config does not validate.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            camera: Camera::with_scale_range(config.min_scale, config.max_scale),
            scheduler: FixedStep::new(config.tick_ms, config.max_steps_per_frame),
            config,
            session_id: Uuid::new_v4(),
            board: Board::new(),
            puzzle: None,
            viewport: DEFAULT_VIEWPORT,
            clock_ms: 0.0,
            pointers: PointerTracker::new(),
            taps: TapDetector::new(),
            gesture: Gesture::Idle,
            move_pending: false,
            selected: None,
            animation: None,
            load_generation: 0,
            completed: false,
            events: Vec::new(),
            callbacks: Callbacks::default(),
            render: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identifier of the installed puzzle, fresh for every install.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Layout of the installed puzzle, if it came from a generator.
    pub fn puzzle(&self) -> Option<&PuzzleConfig> {
        self.puzzle.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Replace the camera. The zoom range of the config still applies.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Camera {
            min_scale: self.config.min_scale,
            max_scale: self.config.max_scale,
            ..camera
        };
        self.camera.scale = self.camera.clamp_scale(self.camera.scale);
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width.max(1.0), height.max(1.0));
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Engine clock, advanced only by `update`.
    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Copy of the current piece list in draw order.
    pub fn pieces(&self) -> Vec<Piece> {
        self.board.snapshot()
    }

    /// `(largest group size, total pieces)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.board.largest_group_size(), self.board.len())
    }

    pub fn has_connected_pieces(&self) -> bool {
        self.board.has_connected_pieces()
    }

    /// Whether the completion normalization has run.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Called with `(largest group, total)` after each discrete interaction.
    pub fn on_progress(&mut self, callback: impl FnMut(usize, usize) + 'static) {
        self.callbacks.progress = Some(Box::new(callback));
    }

    /// Called with the full piece list whenever geometry, orientation or
    /// connections change.
    pub fn on_pieces_changed(&mut self, callback: impl FnMut(&[Piece]) + 'static) {
        self.callbacks.pieces_changed = Some(Box::new(callback));
    }

    /// Called once per frame, after the update steps, to draw.
    pub fn on_render(&mut self, callback: impl FnMut(&PuzzleEngine) + 'static) {
        self.render = Some(Box::new(callback));
    }

    // --- loading ---

    /// Start a load: discard every bit of interaction state and empty the
    /// board. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.reset_interaction();
        self.animation = None;
        self.board.clear();
        self.puzzle = None;
        self.completed = false;
        LoadTicket(self.load_generation)
    }

    /// Install the result of the load started with `ticket`.
    ///
    /// A stale ticket returns [`EngineError::Superseded`] and changes
    /// nothing. A failed load leaves the engine empty and returns the error.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: EngineResult<GeneratedPuzzle>) -> EngineResult<()> {
        if ticket.0 != self.load_generation {
            log::debug!("Dropping superseded puzzle load {}", ticket.0);
            return Err(EngineError::Superseded);
        }
        let puzzle = match result.and_then(|p| p.validate().map(|_| p)) {
            Ok(puzzle) => puzzle,
            Err(err) => {
                log::warn!("Puzzle load failed: {}", err);
                return Err(err);
            }
        };
        self.install(puzzle);
        Ok(())
    }

    /// Load a puzzle from `source` and install it.
    pub async fn load(&mut self, source: &dyn PuzzleSource) -> EngineResult<()> {
        let ticket = self.begin_load();
        let result = source.load().await;
        self.finish_load(ticket, result)
    }

    fn install(&mut self, puzzle: GeneratedPuzzle) {
        let GeneratedPuzzle { mut pieces, config } = puzzle;
        scramble_pieces(&mut pieces, &config);
        log::info!(
            "Installing {}x{} puzzle (shuffle: {}, pre_flip: {}, pre_rotate: {})",
            config.rows,
            config.cols,
            config.shuffle,
            config.pre_flip,
            config.pre_rotate
        );
        self.puzzle = Some(config);
        self.install_pieces(pieces);
    }

    fn install_pieces(&mut self, pieces: Vec<Piece>) {
        self.board = Board::from_pieces(pieces);
        self.board.normalize_connectivity();
        self.session_id = Uuid::new_v4();
        self.completed = self.board.is_complete() && self.board.pieces_ordered().all(Piece::is_locked);
        self.fit_camera_now();
        self.emit(EngineEvent::PuzzleLoaded { pieces: self.board.len() });
        self.notify_pieces_changed();
        self.notify_progress();
    }

    /// Install a saved piece list, bypassing generation and scramble.
    ///
    /// Connection data is trusted; only one-sided links are repaired.
    pub fn restore_pieces(&mut self, pieces: Vec<Piece>) -> EngineResult<()> {
        let mut seen = HashSet::new();
        if let Some(dup) = pieces.iter().find(|p| !seen.insert(p.id)) {
            return Err(EngineError::Config(format!("duplicate piece id {}", dup.id)));
        }
        self.begin_load();
        log::info!("Restoring {} pieces", pieces.len());
        self.install_pieces(pieces);
        Ok(())
    }

    /// [`PuzzleEngine::restore_pieces`] from the JSON written by
    /// [`crate::piece::pieces_to_json`].
    pub fn restore_from_json(&mut self, json: &str) -> EngineResult<()> {
        let pieces = crate::piece::pieces_from_json(json)?;
        self.restore_pieces(pieces)
    }

    // --- scheduling ---

    /// Advance the engine clock by `dt_ms`, apply the latest pointer
    /// positions and step the active animation.
    pub fn update(&mut self, dt_ms: f64) {
        self.clock_ms += dt_ms.max(0.0);
        if self.move_pending {
            self.move_pending = false;
            self.process_move();
        }
        self.step_animation();
    }

    /// Run the fixed update steps owed for `frame_ms` of real time, then
    /// render once. Returns the number of update steps run.
    pub fn frame(&mut self, frame_ms: f64) -> u32 {
        let steps = self.scheduler.advance(frame_ms);
        let step_ms = self.scheduler.step_ms();
        for _ in 0..steps {
            self.update(step_ms);
        }
        self.force_render();
        steps
    }

    /// Invoke the render callback now.
    pub fn force_render(&mut self) {
        if let Some(mut render) = self.render.take() {
            render(&*self);
            self.render = Some(render);
        }
    }

    // --- animation ---

    /// Animate the given pieces (and optionally the camera) from their
    /// current state to the targets over `duration_ms`.
    ///
    /// An animation already in flight is finished first. While an
    /// animation runs, drags and rotations are ignored.
    pub fn animate_to(
        &mut self,
        targets: HashMap<PieceId, PieceTransform>,
        camera_target: Option<Camera>,
        duration_ms: f64,
        on_complete: Option<AnimationDone>,
    ) {
        self.finish_animation_now();
        let animation = Animation::new(
            &self.board,
            &self.camera,
            targets,
            camera_target,
            self.clock_ms,
            duration_ms,
        );
        log::debug!("Animation started ({} ms)", duration_ms);
        self.animation = Some(ActiveAnimation { animation, on_complete });
    }

    fn step_animation(&mut self) {
        let Some(active) = self.animation.as_ref() else {
            return;
        };
        let finished = active
            .animation
            .apply(&mut self.board, &mut self.camera, self.clock_ms);
        if finished {
            self.complete_animation();
        }
    }

    /// Jump the active animation to its target and run its completion.
    fn finish_animation_now(&mut self) {
        if let Some(active) = self.animation.as_ref() {
            active.animation.apply_target(&mut self.board, &mut self.camera);
            self.complete_animation();
        }
    }

    fn complete_animation(&mut self) {
        if let Some(active) = self.animation.take() {
            log::debug!("Animation finished");
            self.emit(EngineEvent::AnimationFinished);
            if let Some(done) = active.on_complete {
                done(self);
            }
        }
    }

    // --- notifications ---

    fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    fn notify_progress(&mut self) {
        let (largest, total) = self.progress();
        if let Some(callback) = self.callbacks.progress.as_mut() {
            callback(largest, total);
        }
    }

    fn notify_pieces_changed(&mut self) {
        if self.callbacks.pieces_changed.is_none() {
            return;
        }
        let pieces = self.board.snapshot();
        if let Some(callback) = self.callbacks.pieces_changed.as_mut() {
            callback(&pieces);
        }
    }

    /// Drop pointer, gesture and tap state.
    fn reset_interaction(&mut self) {
        if let Gesture::Dragging(drag) = &self.gesture {
            log::debug!("Dropping drag of piece {}", drag.piece);
        }
        self.pointers.clear();
        self.taps.reset();
        self.gesture = Gesture::Idle;
        self.move_pending = false;
        self.scheduler.reset();
        if self.selected.take().is_some() {
            self.emit(EngineEvent::Selected(None));
        }
    }

    fn fit_camera_now(&mut self) {
        match self.board.bounds() {
            Some(bounds) => self.camera = self.fitted_camera(bounds),
            None => self.camera.reset(),
        }
    }

    fn fitted_camera(&self, bounds: kurbo::Rect) -> Camera {
        self.camera.fitted(
            bounds,
            self.viewport,
            self.config.fit_padding,
            self.config.status_band_height,
        )
    }
}
