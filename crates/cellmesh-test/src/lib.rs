//! cellmesh Test Harness - Chaos delivery and convergence checks
//!
//! This crate provides:
//! - Seeded chaos delivery with per-lane FIFO
//! - A single-threaded 81-agent board simulator
//! - Agent stream fuzzing
//! - Runtime versus simulator cross-checks
//! - Puzzle fixtures

pub mod chaos;
pub mod fuzz;
pub mod integration;
pub mod puzzles;
pub mod simulator;

pub use chaos::*;
pub use fuzz::*;
pub use integration::*;
pub use simulator::*;
