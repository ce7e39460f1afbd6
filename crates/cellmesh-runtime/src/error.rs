//! Runtime errors

use thiserror::Error;

use cellmesh_core::{BoardId, CoreError};

use crate::Address;

/// Errors raised while hosting cells or supervising a board
///
/// Sudoku inconsistencies are not errors here; they are reported as part
/// of a propagation outcome so that a search driver can back out.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Mailbox closed: {0}")]
    MailboxClosed(Address),

    #[error("Propagation on {board} did not quiesce: {pending} replies outstanding")]
    Timeout { board: BoardId, pending: usize },

    #[error("Board {0} is contradicted")]
    Contradicted(BoardId),

    #[error("Board {0} stalled after an earlier failure")]
    Stalled(BoardId),

    #[error("Unexpected reply on {board}: {message}")]
    UnexpectedReply { board: BoardId, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tracing initialization failed: {0}")]
    Tracing(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
