//! cellmesh Core - Fundamental types and the cell protocol
//!
//! This crate defines the value types shared by every cellmesh component:
//! - Coordinates, digits and the peer relation
//! - Candidate sets and assignments
//! - The passive grid snapshot
//! - The message protocol exchanged between cell agents and their board
//! - Error and inconsistency types

pub mod coord;
pub mod candidates;
pub mod grid;
pub mod message;
pub mod error;

pub use coord::*;
pub use candidates::*;
pub use grid::*;
pub use message::*;
pub use error::*;
