//! One attempt at one pattern
//!
//! Pieces are plain values; frontends map a [`PieceId`] to whatever visual
//! they draw for it.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use super::board::{Board, DropOutcome};
use super::scoring;
use super::view::{DropTarget, Outline};
use crate::consts::GUIDE_OPACITY;
use crate::pattern::{Cell, Pattern, Shape, ShapeKind};
use crate::progress::ProgressKey;
use crate::settings::PlayMode;

/// Piece instance identifier, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceStatus {
    /// In the palette, can be dragged
    Available,
    /// Dropped on a wrong cell, waiting to be discarded
    Rejected,
    Placed(Cell),
    /// Gone from the palette
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: ShapeKind,
    /// Cell of the pattern shape this piece was made for
    pub origin: Cell,
    pub status: PieceStatus,
}

#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    key: ProgressKey,
    mode: PlayMode,
    hints_used: u32,
    pieces: Vec<Piece>,
    solution_shown: bool,
}

impl Session {
    /// Start a session with one shuffled palette piece per pattern shape
    pub fn new<R: Rng + ?Sized>(pattern: Arc<Pattern>, mode: PlayMode, rng: &mut R) -> Self {
        let mut pieces: Vec<Piece> = pattern
            .shapes
            .iter()
            .enumerate()
            .map(|(i, s)| Piece {
                id: PieceId(i as u32),
                kind: s.kind,
                origin: s.cell(),
                status: PieceStatus::Available,
            })
            .collect();
        pieces.shuffle(rng);

        Self {
            key: pattern.progress_key(),
            board: Board::new(pattern),
            mode,
            hints_used: 0,
            pieces,
            solution_shown: false,
        }
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        self.board.pattern()
    }

    pub fn key(&self) -> &ProgressKey {
        &self.key
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Palette order
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    /// Whether the piece may be picked up
    pub fn can_drag(&self, id: PieceId) -> bool {
        !self.solution_shown
            && !self.board.is_complete()
            && self
                .piece(id)
                .is_some_and(|p| p.status == PieceStatus::Available)
    }

    /// Validate a drop and update the piece. `cell` is `None` outside the area.
    pub fn drop_piece(&mut self, id: PieceId, cell: Option<Cell>) -> DropOutcome {
        if !self.can_drag(id) {
            return DropOutcome::Ignored;
        }
        let Some(kind) = self.piece(id).map(|p| p.kind) else {
            return DropOutcome::Ignored;
        };
        let outcome = self.board.drop_piece(id, kind, cell);
        let status = match outcome {
            DropOutcome::Placed { cell, .. } => PieceStatus::Placed(cell),
            DropOutcome::Rejected { .. } => PieceStatus::Rejected,
            DropOutcome::Outside | DropOutcome::Ignored => return outcome,
        };
        if let Some(piece) = self.piece_mut(id) {
            piece.status = status;
        }
        outcome
    }

    /// Remove a rejected piece from play. It is not returned to the palette.
    pub fn discard(&mut self, id: PieceId) -> bool {
        match self.piece_mut(id) {
            Some(piece) if piece.status == PieceStatus::Rejected => {
                piece.status = PieceStatus::Discarded;
                true
            }
            _ => false,
        }
    }

    /// Count a hint and return the shape to highlight, if any is left
    pub fn use_hint(&mut self) -> Option<Shape> {
        self.hints_used += 1;
        scoring::hint_target(&self.board).copied()
    }

    /// Stars this session earns if completed now
    pub fn stars(&self) -> u8 {
        scoring::stars_for_hints(self.hints_used)
    }

    pub fn is_complete(&self) -> bool {
        self.board.is_complete()
    }

    pub fn solution_shown(&self) -> bool {
        self.solution_shown
    }

    /// Freeze the session while the solution is on screen
    pub fn show_solution(&mut self) {
        self.solution_shown = true;
    }

    /// One target per pattern shape; outlined only in guided mode
    pub fn drop_targets(&self) -> Vec<DropTarget> {
        self.pattern()
            .shapes
            .iter()
            .map(|s| DropTarget {
                cell: s.cell(),
                kind: s.kind,
                outline: match self.mode {
                    PlayMode::Guided => Some(Outline {
                        color: s.kind.color(),
                        opacity: GUIDE_OPACITY,
                    }),
                    PlayMode::Free => None,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pattern() -> Arc<Pattern> {
        Arc::new(
            Pattern::new(
                "s",
                3,
                vec![
                    Shape { row: 0, col: 0, kind: ShapeKind::Square },
                    Shape { row: 0, col: 2, kind: ShapeKind::Square },
                    Shape { row: 2, col: 1, kind: ShapeKind::Triangle },
                ],
            )
            .unwrap(),
        )
    }

    fn session(mode: PlayMode) -> Session {
        Session::new(pattern(), mode, &mut Pcg32::seed_from_u64(3))
    }

    fn piece_of(s: &Session, kind: ShapeKind) -> PieceId {
        s.pieces()
            .iter()
            .find(|p| p.kind == kind && p.status == PieceStatus::Available)
            .unwrap()
            .id
    }

    #[test]
    fn test_palette_matches_shapes() {
        let s = session(PlayMode::Guided);
        assert_eq!(s.pieces().len(), 3);
        let mut ids: Vec<u32> = s.pieces().iter().map(|p| p.id.0).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(s.key().as_str(), "grid3_ids");
        assert_eq!(s.hints_used(), 0);
    }

    #[test]
    fn test_same_kind_pieces_are_interchangeable() {
        let mut s = session(PlayMode::Guided);
        let sq = piece_of(&s, ShapeKind::Square);
        // Either square fits either square cell
        assert!(matches!(
            s.drop_piece(sq, Some(Cell::new(0, 2))),
            DropOutcome::Placed { .. }
        ));
        assert_eq!(s.piece(sq).unwrap().status, PieceStatus::Placed(Cell::new(0, 2)));
        // A placed piece cannot be dragged again
        assert!(!s.can_drag(sq));
        assert_eq!(s.drop_piece(sq, Some(Cell::new(0, 0))), DropOutcome::Ignored);
    }

    #[test]
    fn test_rejected_piece_is_discarded_not_returned() {
        let mut s = session(PlayMode::Free);
        let tri = piece_of(&s, ShapeKind::Triangle);
        assert!(matches!(
            s.drop_piece(tri, Some(Cell::new(0, 0))),
            DropOutcome::Rejected { .. }
        ));
        assert!(!s.can_drag(tri));
        assert!(s.discard(tri));
        assert_eq!(s.piece(tri).unwrap().status, PieceStatus::Discarded);
        assert!(!s.discard(tri));

        // With the only triangle gone the pattern cannot be finished
        assert!(
            s.pieces()
                .iter()
                .all(|p| p.kind != ShapeKind::Triangle || p.status == PieceStatus::Discarded)
        );
    }

    #[test]
    fn test_outside_drop_keeps_piece_available() {
        let mut s = session(PlayMode::Guided);
        let tri = piece_of(&s, ShapeKind::Triangle);
        assert_eq!(s.drop_piece(tri, None), DropOutcome::Outside);
        assert!(s.can_drag(tri));
    }

    #[test]
    fn test_hints_count_and_target() {
        let mut s = session(PlayMode::Guided);
        assert_eq!(s.stars(), 3);
        assert_eq!(s.use_hint().map(|sh| sh.cell()), Some(Cell::new(0, 0)));
        assert_eq!(s.stars(), 2);
        assert_eq!(s.use_hint().map(|sh| sh.cell()), Some(Cell::new(0, 0)));
        assert_eq!(s.hints_used(), 2);
        assert_eq!(s.stars(), 1);
    }

    #[test]
    fn test_drop_targets_by_mode() {
        let guided = session(PlayMode::Guided).drop_targets();
        assert_eq!(guided.len(), 3);
        let outline = guided[2].outline.unwrap();
        assert_eq!(outline.color, ShapeKind::Triangle.color());
        assert!(outline.opacity < 1.0);

        let free = session(PlayMode::Free).drop_targets();
        assert!(free.iter().all(|t| t.outline.is_none()));
    }

    #[test]
    fn test_solution_freezes_drags() {
        let mut s = session(PlayMode::Guided);
        let tri = piece_of(&s, ShapeKind::Triangle);
        s.show_solution();
        assert!(!s.can_drag(tri));
        assert_eq!(s.drop_piece(tri, Some(Cell::new(2, 1))), DropOutcome::Ignored);
    }
}
