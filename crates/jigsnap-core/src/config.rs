//! Engine and puzzle configuration.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// When a snapped group counts as correctly placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    /// Every member within tolerance of its solved position.
    PositionOnly,
    /// Position within tolerance and every member at rotation 0.
    #[default]
    PositionAndUpright,
}

/// Tunables for the interaction engine.
///
/// Distances suffixed `_px` or named for the pointer are screen pixels;
/// snap and lock distances are world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum center distance for a snap candidate.
    pub snap_threshold: f64,
    /// Only snap pieces that share the same rotation.
    pub snap_requires_matching_rotation: bool,
    /// Maximum distance from the solved position for locking.
    pub lock_tolerance: f64,
    pub lock_policy: LockPolicy,
    /// Movement before a mouse press turns into a drag or pan.
    pub drag_threshold_mouse: f64,
    /// Movement before a touch turns into a drag or pan.
    pub drag_threshold_touch: f64,
    /// Maximum time between two taps of a double-tap.
    pub double_tap_ms: f64,
    /// Maximum distance between two taps of a double-tap.
    pub double_tap_distance: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Padding kept around fitted content.
    pub fit_padding: f64,
    /// Height reserved at the bottom of the viewport (status strip).
    pub status_band_height: f64,
    /// Zoom factor per wheel delta unit (`factor = exp(-delta * sensitivity)`).
    pub wheel_zoom_sensitivity: f64,
    pub rotate_duration_ms: f64,
    pub fit_duration_ms: f64,
    pub complete_duration_ms: f64,
    pub tidy_duration_ms: f64,
    /// Fixed update step.
    pub tick_ms: f64,
    /// Cap on update steps per rendered frame.
    pub max_steps_per_frame: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 30.0,
            snap_requires_matching_rotation: true,
            lock_tolerance: 4.0,
            lock_policy: LockPolicy::default(),
            drag_threshold_mouse: 3.0,
            drag_threshold_touch: 8.0,
            double_tap_ms: 350.0,
            double_tap_distance: 24.0,
            min_scale: 0.1,
            max_scale: 8.0,
            fit_padding: 24.0,
            status_band_height: 40.0,
            wheel_zoom_sensitivity: 0.0015,
            rotate_duration_ms: 200.0,
            fit_duration_ms: 350.0,
            complete_duration_ms: 600.0,
            tidy_duration_ms: 450.0,
            tick_ms: 1000.0 / 60.0,
            max_steps_per_frame: 5,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(EngineError::Config(format!(
                "scale range [{}, {}] is empty or non-positive",
                self.min_scale, self.max_scale
            )));
        }
        if self.snap_threshold <= 0.0 {
            return Err(EngineError::Config("snap_threshold must be positive".into()));
        }
        if self.lock_tolerance < 0.0 {
            return Err(EngineError::Config("lock_tolerance must not be negative".into()));
        }
        if self.tick_ms <= 0.0 {
            return Err(EngineError::Config("tick_ms must be positive".into()));
        }
        if self.max_steps_per_frame == 0 {
            return Err(EngineError::Config("max_steps_per_frame must be at least 1".into()));
        }
        Ok(())
    }

    /// Drag threshold for the given pointer kind.
    pub fn drag_threshold(&self, is_touch: bool) -> f64 {
        if is_touch {
            self.drag_threshold_touch
        } else {
            self.drag_threshold_mouse
        }
    }
}

/// Puzzle layout produced alongside a generated piece set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub rows: usize,
    pub cols: usize,
    /// Scatter pieces and shuffle draw order on install.
    pub shuffle: bool,
    /// Turn a share of pieces face down on install.
    pub pre_flip: bool,
    /// Give every piece a random quarter turn on install.
    pub pre_rotate: bool,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Seed for the install-time scramble.
    #[serde(default)]
    pub seed: u32,
}

impl PuzzleConfig {
    /// A plain layout with no scramble.
    pub fn new(rows: usize, cols: usize, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            rows,
            cols,
            shuffle: false,
            pre_flip: false,
            pre_rotate: false,
            canvas_width,
            canvas_height,
            seed: 0,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EngineError::Config(format!(
                "grid {}x{} has no cells",
                self.rows, self.cols
            )));
        }
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err(EngineError::Config(format!(
                "canvas {}x{} has no area",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }
}
