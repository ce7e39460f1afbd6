//! Message protocol between cell agents and their board
//!
//! Messages are immutable values. Anything carrying a candidate set
//! carries its own copy, so a message can cross task boundaries without
//! aliasing the sender's state. Equality is by value.

use std::fmt;

use crate::{Assignment, BoardId, CandidateSet, Coord, Inconsistency};

/// Every message in the cellmesh protocol
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// A coordinate is now finally fixed to a digit. Drives elimination.
    Assign(Assignment),

    /// An agent considered `trigger` and did not collapse
    NoChangeReport {
        coord: Coord,
        candidates: CandidateSet,
        trigger: Assignment,
    },

    /// The message just received is inconsistent with the agent's state
    Invalid { reason: String },

    /// Ask an agent for its current candidates
    UnassignedRequest { coord: Coord },

    /// Answer to `UnassignedRequest`
    UnassignedResponse {
        coord: Coord,
        candidates: CandidateSet,
    },

    /// Replicate one board into a freshly created board
    CloneRequest { from: BoardId, to: BoardId },

    /// Seed a cloned agent that is still unassigned
    CloneUnassigned {
        coord: Coord,
        candidates: CandidateSet,
    },

    /// Seed a cloned agent that is already assigned
    CloneAssigned(Assignment),

    /// Start generating a board
    Generate,

    /// Generation finished with a complete board
    Generated,

    /// Generation failed, the board is inconsistent
    InvalidBoard,
}

impl Message {
    pub fn invalid(inconsistency: &Inconsistency) -> Self {
        Message::Invalid {
            reason: inconsistency.to_string(),
        }
    }

    /// Static name of the variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Assign(_) => "Assign",
            Message::NoChangeReport { .. } => "NoChangeReport",
            Message::Invalid { .. } => "Invalid",
            Message::UnassignedRequest { .. } => "UnassignedRequest",
            Message::UnassignedResponse { .. } => "UnassignedResponse",
            Message::CloneRequest { .. } => "CloneRequest",
            Message::CloneUnassigned { .. } => "CloneUnassigned",
            Message::CloneAssigned(_) => "CloneAssigned",
            Message::Generate => "Generate",
            Message::Generated => "Generated",
            Message::InvalidBoard => "InvalidBoard",
        }
    }

    /// Coordinate this message is about, if it names one
    pub fn coord(&self) -> Option<Coord> {
        match self {
            Message::Assign(a) | Message::CloneAssigned(a) => Some(a.coord),
            Message::NoChangeReport { coord, .. }
            | Message::UnassignedRequest { coord }
            | Message::UnassignedResponse { coord, .. }
            | Message::CloneUnassigned { coord, .. } => Some(*coord),
            _ => None,
        }
    }

    /// Board-level vocabulary, never handled by a cell agent
    pub fn is_board_level(&self) -> bool {
        matches!(
            self,
            Message::CloneRequest { .. }
                | Message::Generate
                | Message::Generated
                | Message::InvalidBoard
        )
    }
}

impl From<Assignment> for Message {
    fn from(assignment: Assignment) -> Self {
        Message::Assign(assignment)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Message::Assign(a) | Message::CloneAssigned(a) => write!(f, "{}[{}]", kind, a),
            Message::NoChangeReport {
                coord,
                candidates,
                trigger,
            } => write!(f, "{}[{} {} after {}]", kind, coord, candidates, trigger),
            Message::Invalid { reason } => write!(f, "{}[{}]", kind, reason),
            Message::UnassignedRequest { coord } => write!(f, "{}[{}]", kind, coord),
            Message::UnassignedResponse { coord, candidates }
            | Message::CloneUnassigned { coord, candidates } => {
                write!(f, "{}[{} {}]", kind, coord, candidates)
            }
            Message::CloneRequest { from, to } => write!(f, "{}[from {}, to {}]", kind, from, to),
            Message::Generate | Message::Generated | Message::InvalidBoard => {
                write!(f, "{}[]", kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Digit;

    fn a(row: u8, col: u8, value: u8) -> Assignment {
        Assignment::new(Coord::new(row, col).unwrap(), Digit::new(value).unwrap())
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Message::Assign(a(1, 2, 3)), Message::Assign(a(1, 2, 3)));
        assert_ne!(Message::Assign(a(1, 2, 3)), Message::Assign(a(1, 2, 4)));
        assert_ne!(Message::Assign(a(1, 2, 3)), Message::CloneAssigned(a(1, 2, 3)));
    }

    #[test]
    fn test_candidates_are_copied() {
        let coord = Coord::new(1, 1).unwrap();
        let mut candidates = CandidateSet::full();
        let msg = Message::UnassignedResponse { coord, candidates };

        candidates.remove(Digit::new(1).unwrap());

        match msg {
            Message::UnassignedResponse { candidates: sent, .. } => assert_eq!(sent.len(), 9),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Message::Assign(a(1, 2, 3)).to_string(), "Assign[(1, 2) = 3]");
        assert_eq!(Message::Generate.to_string(), "Generate[]");
        assert_eq!(
            Message::CloneRequest {
                from: BoardId::new(1),
                to: BoardId::new(2)
            }
            .to_string(),
            "CloneRequest[from board-1, to board-2]"
        );
        let report = Message::NoChangeReport {
            coord: Coord::new(5, 5).unwrap(),
            candidates: [Digit::new(2).unwrap(), Digit::new(7).unwrap()]
                .into_iter()
                .collect(),
            trigger: a(5, 1, 4),
        };
        assert_eq!(report.to_string(), "NoChangeReport[(5, 5) [2, 7] after (5, 1) = 4]");
    }

    #[test]
    fn test_coord_and_kind() {
        assert_eq!(Message::Assign(a(3, 4, 5)).coord(), Some(Coord::new(3, 4).unwrap()));
        assert_eq!(Message::Generated.coord(), None);
        assert!(Message::InvalidBoard.is_board_level());
        assert!(!Message::Assign(a(3, 4, 5)).is_board_level());
        assert_eq!(Message::from(a(3, 4, 5)).kind(), "Assign");
    }
}
