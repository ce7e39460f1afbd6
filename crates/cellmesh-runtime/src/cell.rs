//! Cell task - hosts one agent on its own tokio task

use tokio::task::JoinHandle;
use tracing::{trace, warn};

use cellmesh_agent::{AnnounceRoute, CellAgent, Route};
use cellmesh_core::{BoardId, Coord};

use crate::{ActorRef, Address, Envelope, SharedStats};

/// Spawn a task owning a fresh agent for `coord`
///
/// Envelopes are handled one at a time, each to completion. Replies routed
/// to `Route::Sender` go to the envelope's `reply_to`, or to `parent` when
/// the envelope names none. The task ends when every handle to its mailbox
/// is dropped or its parent goes away.
pub fn spawn_cell(
    board: BoardId,
    coord: Coord,
    parent: ActorRef,
    route: AnnounceRoute,
    stats: SharedStats,
) -> (ActorRef, JoinHandle<()>) {
    let address = Address::Cell(board, coord);
    let (mailbox, mut rx) = ActorRef::channel(address);

    let task = tokio::spawn(async move {
        let mut agent = CellAgent::with_route(coord, route);

        while let Some(envelope) = rx.recv().await {
            let reply = agent.handle(&envelope.message);
            stats.lock().record_cell(&envelope.message, reply.as_ref());

            let Some(reply) = reply else {
                continue;
            };
            let target = match reply.route {
                Route::Sender => envelope.reply_to.as_ref().unwrap_or(&parent),
                Route::Parent => &parent,
            };
            trace!(from = %address, to = %target.address(), message = %reply.message, "cell reply");

            if let Err(e) = target.tell(Envelope::new(address, reply.message)) {
                warn!(cell = %address, error = %e, "reply dropped");
                if target.address() == parent.address() {
                    break;
                }
            }
        }

        trace!(cell = %address, state = ?agent.state(), "cell stopped");
    });

    (mailbox, task)
}
