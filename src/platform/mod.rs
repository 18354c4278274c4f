//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, JSON files on native)
//! - Browser entry points and dashboard bindings

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use storage::{KeyValueStore, MemoryStore};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
