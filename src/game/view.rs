//! Rendering and timer seams
//!
//! The controller never touches a concrete rendering surface. Frontends
//! implement [`ViewPort`] to draw and [`TimerQueue`] to deliver delayed
//! [`Timer`] events back as [`InputEvent::Timer`](super::InputEvent::Timer).

use std::time::Duration;

use glam::Vec2;

use super::session::{Piece, PieceId};
use crate::grid::Rect;
use crate::pattern::{Cell, Pattern, Shape, ShapeKind};

/// Feedback signal for sound and visual cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Piece accepted
    Place,
    /// Piece rejected
    Reject,
    /// Hint shown
    Hint,
    /// Pattern completed
    Success,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Place => "place",
            Feedback::Reject => "reject",
            Feedback::Hint => "hint",
            Feedback::Success => "success",
        }
    }

    /// Beep frequency for frontends without sound files
    pub fn tone_hz(&self) -> f32 {
        match self {
            Feedback::Success => 880.0,
            Feedback::Place => 660.0,
            Feedback::Hint | Feedback::Reject => 520.0,
        }
    }
}

/// Result marker drawn on a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceMark {
    Correct,
    Incorrect,
}

/// Pre-drawn outline on a guided drop target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub color: &'static str,
    pub opacity: f32,
}

/// Cell expecting a piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTarget {
    pub cell: Cell,
    pub kind: ShapeKind,
    /// `None` in free mode
    pub outline: Option<Outline>,
}

/// Rendering surface driven by the controller
pub trait ViewPort {
    /// Short text status, also used for screen reader announcements
    fn status(&mut self, text: &str);

    fn show_menu(&mut self);

    /// Draw the pattern for memorization
    fn show_pattern(&mut self, pattern: &Pattern);

    fn show_countdown(&mut self, remaining: u32);

    /// Replace the pattern with empty drop targets on an N×N grid
    fn create_drop_targets(&mut self, grid: u32, targets: &[DropTarget]);

    fn render_palette(&mut self, pieces: &[Piece]);

    /// Current bounding box of the puzzle area
    fn puzzle_area(&self) -> Rect;

    /// Dragged piece follows the pointer
    fn move_drag(&mut self, _piece: PieceId, _pos: Vec2) {}

    /// Drop ended without a placement attempt; return the visual to the palette
    fn cancel_drag(&mut self, piece: PieceId);

    fn mark_piece(&mut self, piece: PieceId, mark: PieceMark);

    /// Pin a placed piece inside its cell
    fn snap_piece(&mut self, piece: PieceId, cell: Cell, bounds: Rect);

    /// Remove a rejected piece for good
    fn discard_piece(&mut self, piece: PieceId);

    fn highlight_hint(&mut self, shape: &Shape);

    /// Overlay the full solution (skip)
    fn show_solution(&mut self, pattern: &Pattern);

    fn show_complete(&mut self, stars: u8);

    /// `audible` is false when sound is turned off
    fn feedback(&mut self, feedback: Feedback, audible: bool);
}

/// Delayed events the controller waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One second of the reveal countdown elapsed
    CountdownTick,
    /// Countdown reached zero and the grace period passed
    RevealDone,
    /// A rejected piece finished its settle animation
    SettleReject(PieceId),
    /// Solution dwell after a skip ended
    SolutionDone,
}

impl TimerKind {
    /// Name used when a timer crosses into JavaScript
    pub fn name(&self) -> &'static str {
        match self {
            TimerKind::CountdownTick => "countdown",
            TimerKind::RevealDone => "reveal",
            TimerKind::SettleReject(_) => "settle",
            TimerKind::SolutionDone => "solution",
        }
    }

    pub fn piece(&self) -> Option<PieceId> {
        match self {
            TimerKind::SettleReject(piece) => Some(*piece),
            _ => None,
        }
    }

    /// Inverse of [`name`](Self::name); `piece` is only read for `settle`
    pub fn from_name(name: &str, piece: u32) -> Option<Self> {
        match name {
            "countdown" => Some(TimerKind::CountdownTick),
            "reveal" => Some(TimerKind::RevealDone),
            "settle" => Some(TimerKind::SettleReject(PieceId(piece))),
            "solution" => Some(TimerKind::SolutionDone),
            _ => None,
        }
    }
}

/// A scheduled event, stamped with the session epoch it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub epoch: u64,
    pub kind: TimerKind,
}

/// Source of delayed timer events
pub trait TimerQueue {
    fn schedule(&mut self, timer: Timer, after: Duration);

    /// Drop every pending timer
    fn cancel_all(&mut self);
}
