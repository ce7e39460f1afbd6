//! cellmesh Runtime - Cell hosting and board supervision
//!
//! This crate runs cell agents concurrently:
//! 1. One tokio task per cell, each owning its agent exclusively
//! 2. Unbounded mailboxes so that no send ever waits
//! 3. A board supervisor that relays self-assignments to every cell
//! 4. Quiescence detection by counting one reply per delivered assignment
//! 5. Board forking through clone seeds
//! 6. Shared statistics and tracing bootstrap

pub mod board;
pub mod cell;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod observability;
pub mod stats;

pub use board::*;
pub use cell::*;
pub use config::*;
pub use error::*;
pub use mailbox::*;
pub use observability::*;
pub use stats::*;
