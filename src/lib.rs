//! Tangram Memory - memorize a grid of shapes, then rebuild it
//!
//! Core modules:
//! - `pattern`: Pattern model and catalog
//! - `grid`: Pointer to grid cell resolution
//! - `game`: Placement validation, scoring and the session controller
//! - `progress`: Persisted per-pattern progress, import/export and summaries
//! - `platform`: Browser/native storage and entry points
//! - `settings`: Player preferences

pub mod error;
pub mod game;
pub mod grid;
pub mod pattern;
pub mod platform;
pub mod progress;
pub mod settings;

pub use error::{CatalogError, CsvError, ImportError, PatternError, StorageError};
pub use game::{GameController, InputEvent, Phase};
pub use pattern::{Catalog, Cell, Pattern, Shape, ShapeKind};
pub use progress::{ProgressKey, ProgressRecord, ProgressStore, ProgressTracker};
pub use settings::{PlayMode, Settings};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fraction of the puzzle area left empty on each side of the grid
    pub const GRID_INSET: f32 = 0.06;

    pub const MAX_STARS: u8 = 3;

    /// Default memorization time
    pub const DEFAULT_VIEW_SECONDS: u32 = 5;

    /// Opacity of guided-mode target outlines
    pub const GUIDE_OPACITY: f32 = 0x22 as f32 / 255.0;

    /// Reveal countdown step
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
    /// Pause between the countdown reaching zero and placement
    pub const REVEAL_GRACE: Duration = Duration::from_millis(200);
    /// Rejected piece stays marked this long before it is discarded
    pub const REJECT_SETTLE: Duration = Duration::from_millis(500);
    /// How long a skipped pattern's solution stays on screen
    pub const SOLUTION_DWELL: Duration = Duration::from_millis(1500);
}
