//! Placement validation and win detection
//!
//! `Empty → InProgress → Complete`. Complete is terminal: later drops are
//! ignored.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::session::PieceId;
use crate::pattern::{Cell, Pattern, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    Empty,
    InProgress,
    Complete,
}

/// Why a drop onto a cell was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The pattern has no shape at the cell
    NoShape,
    WrongKind { expected: ShapeKind },
    Occupied,
}

/// What a drop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released outside the puzzle area; nothing changed
    Outside,
    /// Board already complete, or the piece cannot be dropped
    Ignored,
    Placed { cell: Cell, complete: bool },
    Rejected { cell: Cell, reason: RejectReason },
}

/// Placed pieces for one pattern, keyed by cell
#[derive(Debug, Clone)]
pub struct Board {
    pattern: Arc<Pattern>,
    placed: BTreeMap<Cell, PieceId>,
}

impl Board {
    pub fn new(pattern: Arc<Pattern>) -> Self {
        Self {
            pattern,
            placed: BTreeMap::new(),
        }
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    pub fn status(&self) -> BoardStatus {
        if self.placed.len() >= self.pattern.required() {
            BoardStatus::Complete
        } else if self.placed.is_empty() {
            BoardStatus::Empty
        } else {
            BoardStatus::InProgress
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == BoardStatus::Complete
    }

    pub fn placed(&self) -> &BTreeMap<Cell, PieceId> {
        &self.placed
    }

    pub fn is_placed(&self, cell: Cell) -> bool {
        self.placed.contains_key(&cell)
    }

    /// Validate dropping a piece of `kind` on `cell` (`None` = outside)
    pub fn drop_piece(&mut self, piece: PieceId, kind: ShapeKind, cell: Option<Cell>) -> DropOutcome {
        let Some(cell) = cell else {
            return DropOutcome::Outside;
        };
        if self.is_complete() {
            return DropOutcome::Ignored;
        }
        let reason = match self.pattern.shape_at(cell) {
            None => RejectReason::NoShape,
            Some(shape) if shape.kind != kind => RejectReason::WrongKind {
                expected: shape.kind,
            },
            Some(_) if self.placed.contains_key(&cell) => RejectReason::Occupied,
            Some(_) => {
                self.placed.insert(cell, piece);
                return DropOutcome::Placed {
                    cell,
                    complete: self.is_complete(),
                };
            }
        };
        DropOutcome::Rejected { cell, reason }
    }
}
