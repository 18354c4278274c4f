//! Game flow
//!
//! All gameplay logic lives here, driven by discrete [`InputEvent`]s:
//! - No rendering or platform dependencies (see [`view`])
//! - Seeded RNG only
//! - One event at a time, no background work

pub mod board;
pub mod controller;
pub mod scoring;
pub mod session;
pub mod view;

use glam::Vec2;

use crate::settings::PlayMode;

pub use board::{Board, BoardStatus, DropOutcome, RejectReason};
pub use controller::{GameController, Phase};
pub use scoring::{hint_target, stars_for_hints};
pub use session::{Piece, PieceId, PieceStatus, Session};
pub use view::{DropTarget, Feedback, Outline, PieceMark, Timer, TimerKind, TimerQueue, ViewPort};

/// Everything that can move the game forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Start button: pick a pattern for the selected grid size
    Start,
    /// Continue to a new pattern after completion
    Next,
    Hint,
    /// Give up and reveal the solution
    Skip,
    BackToMenu,
    SelectGrid(u32),
    SelectMode(PlayMode),
    SetViewSeconds(u32),
    SetSound(bool),
    PointerDown { pointer: u32, piece: PieceId, pos: Vec2 },
    PointerMove { pointer: u32, pos: Vec2 },
    PointerUp { pointer: u32, pos: Vec2 },
    Timer(Timer),
}
