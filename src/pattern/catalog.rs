//! Pattern catalog
//!
//! Loaded once at startup from JSON. Accepts either a bare array of patterns
//! or an object with a `patterns` array.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;

use super::Pattern;
use crate::error::CatalogError;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Pattern>),
    Wrapped {
        #[serde(default)]
        patterns: Vec<Pattern>,
    },
}

/// Immutable set of pattern definitions
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    patterns: Vec<Arc<Pattern>>,
}

impl Catalog {
    /// Build a catalog from already-validated patterns
    pub fn new(patterns: Vec<Pattern>) -> Result<Self, CatalogError> {
        for p in &patterns {
            p.validate()?;
        }
        Ok(Self {
            patterns: patterns.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a catalog payload
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let patterns = match serde_json::from_str::<CatalogFile>(json)? {
            CatalogFile::List(patterns) => patterns,
            CatalogFile::Wrapped { patterns } => patterns,
        };
        let catalog = Self::new(patterns)?;
        log::info!("Loaded {} patterns", catalog.len());
        Ok(catalog)
    }

    /// Read and parse a catalog file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Arc<Pattern>> {
        self.patterns.iter()
    }

    /// Pattern counts per grid size, ascending
    pub fn grid_sizes(&self) -> BTreeMap<u32, usize> {
        let mut sizes = BTreeMap::new();
        for p in &self.patterns {
            *sizes.entry(p.grid).or_insert(0) += 1;
        }
        sizes
    }

    /// Uniformly pick a pattern with the given grid size
    pub fn pick<R: Rng + ?Sized>(&self, grid: u32, rng: &mut R) -> Option<Arc<Pattern>> {
        let pool: Vec<&Arc<Pattern>> = self.patterns.iter().filter(|p| p.grid == grid).collect();
        pool.choose(rng).map(|p| Arc::clone(p))
    }
}
