//! Error types for cellmesh

use thiserror::Error;

use crate::{Assignment, Coord, Digit};

/// Core cellmesh errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Coordinate out of range: ({row}, {col})")]
    CoordOutOfRange { row: u8, col: u8 },

    #[error("Digit out of range: {0}")]
    DigitOutOfRange(u8),

    #[error("Grid parse error: {0}")]
    GridParse(String),
}

/// Result type for cellmesh core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// A cell agent's state cannot accommodate an assignment.
///
/// These are never fatal. The text of an inconsistency is carried in
/// `Message::Invalid` so that a search driver can abandon the branch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    #[error("no candidates left at {coord} after {trigger}")]
    NoCandidates { coord: Coord, trigger: Assignment },

    #[error("{trigger} duplicates the value fixed at peer {coord}")]
    DuplicatePeerValue { coord: Coord, trigger: Assignment },

    #[error("{trigger} conflicts with {coord} already fixed to {current}")]
    ConflictingAssignment {
        coord: Coord,
        current: Digit,
        trigger: Assignment,
    },

    #[error("{trigger} uses a value already eliminated at {coord}")]
    EliminatedValue { coord: Coord, trigger: Assignment },
}

impl Inconsistency {
    /// Coordinate of the agent that detected the inconsistency
    pub fn coord(&self) -> Coord {
        match self {
            Inconsistency::NoCandidates { coord, .. }
            | Inconsistency::DuplicatePeerValue { coord, .. }
            | Inconsistency::ConflictingAssignment { coord, .. }
            | Inconsistency::EliminatedValue { coord, .. } => *coord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistency_reason_text() {
        let coord = Coord::new(1, 1).unwrap();
        let trigger = Assignment::new(Coord::new(1, 9).unwrap(), Digit::new(4).unwrap());
        let err = Inconsistency::NoCandidates { coord, trigger };

        assert_eq!(err.to_string(), "no candidates left at (1, 1) after (1, 9) = 4");
        assert_eq!(err.coord(), coord);
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::CoordOutOfRange { row: 0, col: 10 };
        assert_eq!(err.to_string(), "Coordinate out of range: (0, 10)");
    }
}
