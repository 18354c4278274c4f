//! Grid coordinate resolution
//!
//! Maps a pointer release position inside the puzzle area to a grid cell.
//! The grid is drawn inset by [`GRID_INSET`](crate::consts::GRID_INSET) on
//! each side of the area's bounding box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRID_INSET;
use crate::pattern::Cell;

/// Axis-aligned bounding box in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Edges count as inside
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }
}

/// Cell layout of an N×N grid drawn inside a puzzle area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    area: Rect,
    origin: Vec2,
    cell_size: Vec2,
    n: u32,
}

impl GridLayout {
    pub fn new(area: Rect, n: u32) -> Self {
        let n = n.max(1);
        let origin = area.min + area.size * GRID_INSET;
        let usable = area.size * (1.0 - 2.0 * GRID_INSET);
        Self {
            area,
            origin,
            cell_size: usable / n as f32,
            n,
        }
    }

    /// Cell under the pointer, or `None` when the pointer is outside the area.
    ///
    /// Positions in the inset margin clamp to the nearest edge cell.
    pub fn resolve(&self, pointer: Vec2) -> Option<Cell> {
        if !self.area.contains(pointer) {
            return None;
        }
        let rel = (pointer - self.origin) / self.cell_size;
        Some(Cell::new(self.axis(rel.y), self.axis(rel.x)))
    }

    fn axis(&self, v: f32) -> u32 {
        let max = i64::from(self.n) - 1;
        // NaN (zero-sized area) casts to 0
        (v.floor() as i64).clamp(0, max) as u32
    }

    /// Bounding box of a cell, for snapping a placed piece
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        Rect {
            min: self.origin + self.cell_size * Vec2::new(cell.col as f32, cell.row as f32),
            size: self.cell_size,
        }
    }

    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        self.cell_rect(cell).center()
    }
}

/// Resolve a pointer position against an N×N grid in `area`
pub fn resolve_cell(pointer: Vec2, area: Rect, n: u32) -> Option<Cell> {
    GridLayout::new(area, n).resolve(pointer)
}
