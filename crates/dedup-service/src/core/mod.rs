//! Decision logic of the dedup service

pub mod engine;

pub use engine::{DedupEngine, ItemVerdict};
