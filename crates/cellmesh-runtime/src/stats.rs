//! Board statistics shared by the supervisor and its cell tasks

use std::sync::Arc;

use parking_lot::Mutex;

use cellmesh_agent::Outbound;
use cellmesh_core::Message;

/// Shared, lock-protected statistics handle
pub type SharedStats = Arc<Mutex<BoardStats>>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub messages_handled: u64,
    pub assigns_handled: u64,
    pub collapses: u64,
    pub conflicts: u64,
    pub relayed: u64,
    pub waves: u64,
}

impl BoardStats {
    pub fn shared() -> SharedStats {
        Arc::new(Mutex::new(BoardStats::default()))
    }

    /// Record one message handled by a cell and its reply
    pub fn record_cell(&mut self, message: &Message, reply: Option<&Outbound>) {
        self.messages_handled += 1;
        if matches!(message, Message::Assign(_)) {
            self.assigns_handled += 1;
        }
        match reply.map(|out| &out.message) {
            Some(Message::Assign(_)) => self.collapses += 1,
            Some(Message::Invalid { .. }) => self.conflicts += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmesh_core::{Assignment, Coord, Digit};

    #[test]
    fn test_record_cell() {
        let a = Assignment::new(Coord::new(1, 1).unwrap(), Digit::new(1).unwrap());
        let mut stats = BoardStats::default();

        stats.record_cell(&Message::Assign(a), Some(&Outbound::to_parent(Message::Assign(a))));
        stats.record_cell(
            &Message::Assign(a),
            Some(&Outbound::to_sender(Message::Invalid {
                reason: "x".into(),
            })),
        );
        stats.record_cell(&Message::Generate, None);

        assert_eq!(stats.messages_handled, 3);
        assert_eq!(stats.assigns_handled, 2);
        assert_eq!(stats.collapses, 1);
        assert_eq!(stats.conflicts, 1);
    }
}
