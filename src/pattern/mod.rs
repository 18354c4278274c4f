//! Pattern definitions
//!
//! A pattern is a fixed arrangement of typed shapes on an N×N grid. Patterns
//! are validated once when the catalog loads and never change afterwards.

pub mod catalog;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::progress::ProgressKey;

pub use catalog::Catalog;

/// Shape types a pattern cell can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Rectangle,
    Diamond,
    Star,
    Heart,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Rectangle,
        ShapeKind::Diamond,
        ShapeKind::Star,
        ShapeKind::Heart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
        }
    }

    /// Fill color used for the reveal, outlines and hints
    pub fn color(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "#e74c3c",
            ShapeKind::Square => "#3498db",
            ShapeKind::Triangle => "#f1c40f",
            ShapeKind::Rectangle => "#2ecc71",
            ShapeKind::Diamond => "#9b59b6",
            ShapeKind::Star => "#e67e22",
            ShapeKind::Heart => "#ff6384",
        }
    }

    /// Palette glyph
    pub fn glyph(&self) -> char {
        match self {
            ShapeKind::Circle => '●',
            ShapeKind::Square => '■',
            ShapeKind::Triangle => '▲',
            ShapeKind::Rectangle => '▭',
            ShapeKind::Diamond => '◆',
            ShapeKind::Star => '★',
            ShapeKind::Heart => '❤',
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grid cell. Displays as `row,col`, the placement map key format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// One required shape of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub row: u32,
    pub col: u32,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}

/// A puzzle challenge. Build through the catalog or [`Pattern::new`] so the
/// grid and cell invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub grid: u32,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Pattern {
    /// Create a validated pattern
    pub fn new(
        id: impl Into<String>,
        grid: u32,
        shapes: Vec<Shape>,
    ) -> Result<Self, PatternError> {
        let pattern = Self {
            id: id.into(),
            grid,
            shapes,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Check grid size, bounds and cell uniqueness
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.grid == 0 {
            return Err(PatternError::EmptyGrid {
                id: self.id.clone(),
            });
        }
        let mut seen = HashSet::with_capacity(self.shapes.len());
        for shape in &self.shapes {
            let cell = shape.cell();
            if cell.row >= self.grid || cell.col >= self.grid {
                return Err(PatternError::OutOfBounds {
                    id: self.id.clone(),
                    grid: self.grid,
                    cell,
                });
            }
            if !seen.insert(cell) {
                return Err(PatternError::DuplicateCell {
                    id: self.id.clone(),
                    cell,
                });
            }
        }
        Ok(())
    }

    /// The shape required at `cell`, if any
    pub fn shape_at(&self, cell: Cell) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.cell() == cell)
    }

    /// Number of placements needed to complete the pattern
    pub fn required(&self) -> usize {
        self.shapes.len()
    }

    /// Persistence key for this pattern
    pub fn progress_key(&self) -> ProgressKey {
        ProgressKey::new(self.grid, &self.id)
    }
}
