//! Outbound replies and where they go

use cellmesh_core::Message;

/// Destination of a reply, resolved by whoever hosts the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The sender of the message being handled
    Sender,
    /// The agent's fixed supervisor
    Parent,
}

/// Where a cell sends its self-assignment announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnnounceRoute {
    /// Fixed supervisor, which rebroadcasts to every peer
    #[default]
    Parent,
    /// Whoever sent the eliminating assignment
    Sender,
}

impl From<AnnounceRoute> for Route {
    fn from(route: AnnounceRoute) -> Self {
        match route {
            AnnounceRoute::Parent => Route::Parent,
            AnnounceRoute::Sender => Route::Sender,
        }
    }
}

/// A single reply produced by handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub route: Route,
    pub message: Message,
}

impl Outbound {
    pub fn to_sender(message: Message) -> Self {
        Outbound {
            route: Route::Sender,
            message,
        }
    }

    pub fn to_parent(message: Message) -> Self {
        Outbound {
            route: Route::Parent,
            message,
        }
    }
}
