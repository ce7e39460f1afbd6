//! cellmesh Agent - Per-cell constraint propagation
//!
//! This crate implements the cell agent state machine:
//! - Peer elimination on incoming assignments
//! - Collapse to a naked single and self-announcement
//! - Retirement once the cell is assigned
//! - Inconsistency reporting
//! - Clone seeding for forked boards
//!
//! The agent is synchronous and owns its candidate set outright. Hosting
//! it on a task and moving messages around is the runtime's job.

pub mod agent;
pub mod outbound;

pub use agent::*;
pub use outbound::*;
