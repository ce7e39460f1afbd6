//! Mailboxes, addresses and envelopes

use std::fmt;

use tokio::sync::mpsc;

use cellmesh_core::{BoardId, Coord, Message};

use crate::{RuntimeError, RuntimeResult};

/// Who sent or receives an envelope
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Cell(BoardId, Coord),
    Supervisor(BoardId),
    External,
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Cell(board, coord) => write!(f, "{}/cell{}", board, coord),
            Address::Supervisor(board) => write!(f, "{}/supervisor", board),
            Address::External => write!(f, "external"),
        }
    }
}

/// A message in flight
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: Address,
    /// Where `Route::Sender` replies go; the receiver's parent when absent
    pub reply_to: Option<ActorRef>,
    pub message: Message,
}

impl Envelope {
    pub fn new(from: Address, message: Message) -> Self {
        Envelope {
            from,
            reply_to: None,
            message,
        }
    }

    pub fn with_reply_to(mut self, reply_to: ActorRef) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

/// Fire-and-forget handle to a mailbox
///
/// Sends never wait. A send only fails once the receiving task is gone.
#[derive(Clone)]
pub struct ActorRef {
    address: Address,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ActorRef {
    pub fn new(address: Address, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        ActorRef { address, tx }
    }

    /// Create a handle together with the receiving end of its mailbox
    pub fn channel(address: Address) -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ActorRef::new(address, tx), rx)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn tell(&self, envelope: Envelope) -> RuntimeResult<()> {
        self.tx
            .send(envelope)
            .map_err(|_| RuntimeError::MailboxClosed(self.address))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({})", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tell_and_receive() {
        let (actor, mut rx) = ActorRef::channel(Address::Supervisor(BoardId::new(3)));
        actor
            .tell(Envelope::new(Address::External, Message::Generate))
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.from, Address::External);
        assert_eq!(envelope.message, Message::Generate);
        assert!(envelope.reply_to.is_none());
    }

    #[tokio::test]
    async fn test_tell_after_close_fails() {
        let (actor, rx) = ActorRef::channel(Address::External);
        drop(rx);

        assert!(actor.is_closed());
        let err = actor
            .tell(Envelope::new(Address::External, Message::Generated))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::MailboxClosed(Address::External)));
    }

    #[test]
    fn test_address_display() {
        let coord = Coord::new(2, 7).unwrap();
        assert_eq!(
            Address::Cell(BoardId::new(1), coord).to_string(),
            "board-1/cell(2, 7)"
        );
        assert_eq!(Address::Supervisor(BoardId::ZERO).to_string(), "board-0/supervisor");
    }
}
