//! Cell agent - one board position and its candidate set
//!
//! An agent starts with every digit as a candidate and only ever removes
//! digits. Each handled message produces at most one reply:
//!
//! ```text
//! Assign(peer)       -> remove digit -> 1 left  -> Assign(self) via announce route, retire
//!                                    -> 0 left  -> Invalid to sender
//!                                    -> else    -> NoChangeReport to parent
//! Assign(self)       -> retire, NoChangeReport to parent
//!                       (Invalid to sender if the digit was already eliminated)
//! Assign(unrelated)  -> NoChangeReport to parent
//! UnassignedRequest  -> UnassignedResponse to sender
//! Clone*             -> seed, silent
//! ```
//!
//! Elimination is idempotent and commutative, so duplicate or reordered
//! delivery of assignments converges on the same candidate set.

use cellmesh_core::{Assignment, CandidateSet, Coord, Digit, Inconsistency, Message};
use tracing::{debug, trace, warn};

use crate::{AnnounceRoute, Outbound};

/// Lifecycle of a cell agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Two or more candidates
    Active,
    /// Exactly one candidate, about to announce itself
    Collapsing,
    /// Assigned; the candidate set is cleared for good
    Retired,
    /// Never assigned and no candidates left; answers every assignment with `Invalid`
    Exhausted,
}

/// Owner of one cell's candidate set
#[derive(Debug, Clone)]
pub struct CellAgent {
    coord: Coord,
    candidates: CandidateSet,
    assigned: Option<Digit>,
    announce: AnnounceRoute,
}

impl CellAgent {
    /// Create an agent with the full candidate set
    pub fn new(coord: Coord) -> Self {
        Self::with_route(coord, AnnounceRoute::default())
    }

    pub fn with_route(coord: Coord, announce: AnnounceRoute) -> Self {
        CellAgent {
            coord,
            candidates: CandidateSet::full(),
            assigned: None,
            announce,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// Copy of the current candidate set
    pub fn candidates(&self) -> CandidateSet {
        self.candidates
    }

    /// Digit this cell is fixed to, once retired
    pub fn assigned(&self) -> Option<Digit> {
        self.assigned
    }

    pub fn announce_route(&self) -> AnnounceRoute {
        self.announce
    }

    pub fn state(&self) -> AgentState {
        if self.assigned.is_some() {
            return AgentState::Retired;
        }
        match self.candidates.len() {
            0 => AgentState::Exhausted,
            1 => AgentState::Collapsing,
            _ => AgentState::Active,
        }
    }

    /// No legal digit remains and the cell was never assigned
    pub fn is_exhausted(&self) -> bool {
        self.assigned.is_none() && self.candidates.is_empty()
    }

    /// Handle one message to completion
    pub fn handle(&mut self, message: &Message) -> Option<Outbound> {
        match message {
            Message::Assign(trigger) => Some(self.on_assign(*trigger)),
            Message::UnassignedRequest { coord } => self.on_unassigned_request(*coord),
            Message::CloneUnassigned { coord, candidates } => {
                self.seed_unassigned(*coord, *candidates);
                None
            }
            Message::CloneAssigned(assignment) => {
                self.seed_assigned(*assignment);
                None
            }
            other => {
                debug!(coord = %self.coord, kind = other.kind(), "cell ignoring message");
                None
            }
        }
    }

    fn on_assign(&mut self, trigger: Assignment) -> Outbound {
        if let Some(own) = self.assigned {
            return self.on_assign_retired(own, trigger);
        }

        if trigger.coord == self.coord {
            let legal = self.candidates.contains(trigger.digit);
            self.retire(trigger.digit);
            if !legal {
                return self.reject(Inconsistency::EliminatedValue {
                    coord: self.coord,
                    trigger,
                });
            }
            return self.report(trigger);
        }

        if self.coord.is_peer(trigger.coord) && self.candidates.remove(trigger.digit) {
            trace!(coord = %self.coord, %trigger, remaining = %self.candidates, "eliminated");
        }

        self.evaluate(trigger)
    }

    // Retired agents keep acknowledging so that a supervisor counting replies
    // sees exactly one per delivered assignment.
    fn on_assign_retired(&self, own: Digit, trigger: Assignment) -> Outbound {
        if trigger.coord == self.coord {
            if trigger.digit != own {
                return self.reject(Inconsistency::ConflictingAssignment {
                    coord: self.coord,
                    current: own,
                    trigger,
                });
            }
        } else if self.coord.is_peer(trigger.coord) && trigger.digit == own {
            return self.reject(Inconsistency::DuplicatePeerValue {
                coord: self.coord,
                trigger,
            });
        }
        self.report(trigger)
    }

    fn evaluate(&mut self, trigger: Assignment) -> Outbound {
        match self.candidates.single() {
            Some(digit) => self.collapse(digit),
            None if self.candidates.is_empty() => self.reject(Inconsistency::NoCandidates {
                coord: self.coord,
                trigger,
            }),
            None => self.report(trigger),
        }
    }

    fn collapse(&mut self, digit: Digit) -> Outbound {
        let announcement = Assignment::new(self.coord, digit);
        self.retire(digit);
        debug!(%announcement, route = ?self.announce, "cell set by this cell");
        Outbound {
            route: self.announce.into(),
            message: Message::Assign(announcement),
        }
    }

    fn retire(&mut self, digit: Digit) {
        self.assigned = Some(digit);
        self.candidates.clear();
    }

    fn report(&self, trigger: Assignment) -> Outbound {
        Outbound::to_parent(Message::NoChangeReport {
            coord: self.coord,
            candidates: self.candidates,
            trigger,
        })
    }

    fn reject(&self, inconsistency: Inconsistency) -> Outbound {
        debug!(coord = %self.coord, reason = %inconsistency, "cell rejecting assignment");
        Outbound::to_sender(Message::invalid(&inconsistency))
    }

    fn on_unassigned_request(&self, coord: Coord) -> Option<Outbound> {
        if coord != self.coord {
            warn!(cell = %self.coord, requested = %coord, "misaddressed candidate request");
            return None;
        }
        Some(Outbound::to_sender(Message::UnassignedResponse {
            coord,
            candidates: self.candidates,
        }))
    }

    fn seed_unassigned(&mut self, coord: Coord, seed: CandidateSet) {
        if coord != self.coord {
            warn!(cell = %self.coord, seed = %coord, "misaddressed clone seed");
            return;
        }
        if self.assigned.is_some() {
            warn!(cell = %self.coord, "unassigned seed for a retired cell");
            return;
        }
        self.candidates.intersect(seed);
    }

    fn seed_assigned(&mut self, assignment: Assignment) {
        if assignment.coord != self.coord {
            warn!(cell = %self.coord, seed = %assignment, "misaddressed clone seed");
            return;
        }
        match self.assigned {
            Some(own) if own != assignment.digit => {
                warn!(cell = %self.coord, %own, seed = %assignment, "conflicting clone seed");
            }
            _ => self.retire(assignment.digit),
        }
    }
}
