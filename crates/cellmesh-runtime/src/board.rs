//! Board supervisor - 81 cell tasks and the propagation relay
//!
//! The board is the fixed parent of its cells. Every self-assignment a
//! cell announces is rebroadcast to all 81 cells, so every peer learns
//! it regardless of delivery order. Each delivered `Assign` produces
//! exactly one reply, which makes quiescence a simple count:
//!
//! ```text
//! assign(a) ──► Assign(a) × 81 ──► cells
//!                                   ├─ NoChangeReport ─┐
//!                                   ├─ Invalid ────────┤ pending -= 1
//!                                   └─ Assign(b) ──────┘ + relay Assign(b) × 81, pending += 81
//! pending == 0 ──► Propagation
//! ```
//!
//! A wave or query that fails part way leaves replies in flight that the
//! count can no longer account for, so the board stalls and refuses any
//! further work. Fork a healthy board before risky work instead.
//!
//! Every `Assign` a cell receives comes from the supervisor with the
//! supervisor as `reply_to`, so `AnnounceRoute::Sender` and
//! `AnnounceRoute::Parent` deliver announcements to the same place here.
//! The distinction matters only to callers that address cells directly.

use std::fmt;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use cellmesh_core::{Assignment, BoardId, CandidateSet, Coord, Grid, Message, CELL_COUNT};

use crate::{
    spawn_cell, ActorRef, Address, BoardStats, Envelope, RuntimeConfig, RuntimeError,
    RuntimeResult, SharedStats,
};

/// Capacity of the board event channel
const EVENT_CAPACITY: usize = 16;

/// How a propagation wave ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No cell can make further progress; some cells remain open
    Settled,
    /// Every cell is assigned
    Solved,
    /// At least one cell reported an inconsistency
    Contradiction,
}

/// Result of one or more propagation waves
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Assignments made by the caller
    pub given: Vec<Assignment>,
    /// Self-assignments announced by cells, in arrival order
    pub announced: Vec<Assignment>,
    /// Reasons carried by `Invalid` replies
    pub conflicts: Vec<String>,
    /// Replies received
    pub replies: usize,
    /// Whether the board was complete when the waves ended
    pub complete: bool,
}

impl Propagation {
    pub fn outcome(&self) -> Outcome {
        if !self.conflicts.is_empty() {
            Outcome::Contradiction
        } else if self.complete {
            Outcome::Solved
        } else {
            Outcome::Settled
        }
    }

    pub fn is_contradiction(&self) -> bool {
        self.outcome() == Outcome::Contradiction
    }

    fn absorb(&mut self, other: Propagation) {
        self.given.extend(other.given);
        self.announced.extend(other.announced);
        self.conflicts.extend(other.conflicts);
        self.replies += other.replies;
        self.complete = other.complete;
    }
}

/// A board of 81 concurrently running cell agents
pub struct Board {
    id: BoardId,
    config: RuntimeConfig,
    supervisor: ActorRef,
    inbox: mpsc::UnboundedReceiver<Envelope>,
    cells: Vec<ActorRef>,
    tasks: Vec<JoinHandle<()>>,
    grid: Grid,
    contradicted: bool,
    stalled: bool,
    stats: SharedStats,
    events: broadcast::Sender<Message>,
}

impl Board {
    /// Spawn 81 cell tasks with full candidate sets
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(id: BoardId, config: RuntimeConfig) -> Self {
        let (supervisor, inbox) = ActorRef::channel(Address::Supervisor(id));
        let stats = BoardStats::shared();
        let route = config.announce_route();

        let (cells, tasks): (Vec<_>, Vec<_>) = Coord::all()
            .map(|coord| spawn_cell(id, coord, supervisor.clone(), route, stats.clone()))
            .unzip();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        debug!(board = %id, cells = cells.len(), ?route, "board spawned");

        Board {
            id,
            config,
            supervisor,
            inbox,
            cells,
            tasks,
            grid: Grid::new(),
            contradicted: false,
            stalled: false,
            stats,
            events,
        }
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Snapshot of every finalized assignment seen so far
    pub fn grid(&self) -> Grid {
        self.grid.clone()
    }

    pub fn is_contradicted(&self) -> bool {
        self.contradicted
    }

    /// Whether an earlier wave or query failed and left replies unaccounted for
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn stats(&self) -> BoardStats {
        self.stats.lock().clone()
    }

    /// Board-level outcomes: `Generated` once complete, `InvalidBoard` on contradiction
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }

    /// Assign a cell and propagate until no cell can make progress
    pub async fn assign(&mut self, assignment: Assignment) -> RuntimeResult<Propagation> {
        self.ensure_live()?;
        let result = self.propagate(assignment).await;
        self.stall_on_error(result)
    }

    async fn propagate(&mut self, assignment: Assignment) -> RuntimeResult<Propagation> {
        let mut wave = Propagation {
            given: vec![assignment],
            ..Propagation::default()
        };
        self.stats.lock().waves += 1;

        self.grid.set(assignment);
        self.broadcast(assignment)?;
        let mut pending = CELL_COUNT;
        let deadline = Instant::now() + self.config.quiesce_timeout();

        while pending > 0 {
            let envelope = match timeout_at(deadline, self.inbox.recv()).await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => return Err(RuntimeError::MailboxClosed(self.supervisor.address())),
                Err(_) => {
                    warn!(board = %self.id, pending, "propagation timed out");
                    return Err(RuntimeError::Timeout {
                        board: self.id,
                        pending,
                    });
                }
            };

            match envelope.message {
                Message::Assign(announced) => {
                    pending -= 1;
                    wave.replies += 1;
                    wave.announced.push(announced);
                    self.grid.set(announced);
                    self.broadcast(announced)?;
                    self.stats.lock().relayed += 1;
                    pending += CELL_COUNT;
                }
                Message::NoChangeReport { .. } => {
                    pending -= 1;
                    wave.replies += 1;
                }
                Message::Invalid { reason } => {
                    pending -= 1;
                    wave.replies += 1;
                    debug!(board = %self.id, from = %envelope.from, %reason, "conflict");
                    wave.conflicts.push(reason);
                }
                other => {
                    debug!(board = %self.id, from = %envelope.from, message = %other, "ignoring stray reply");
                }
            }
        }

        wave.complete = self.grid.is_complete();
        self.settle(&wave);
        Ok(wave)
    }

    /// Assign every given of `puzzle` in row-major order
    ///
    /// Givens already derived by earlier waves are skipped. Stops at the
    /// first contradiction.
    pub async fn seed(&mut self, puzzle: &Grid) -> RuntimeResult<Propagation> {
        let mut total = Propagation::default();
        for given in puzzle.assigned() {
            if self.grid.get(given.coord) == Some(given) {
                continue;
            }
            let wave = self.assign(given).await?;
            let stop = wave.is_contradiction();
            total.absorb(wave);
            if stop {
                break;
            }
        }
        total.complete = self.grid.is_complete();
        Ok(total)
    }

    /// Current candidate set of a cell; empty once the cell is assigned
    pub async fn candidates(&mut self, coord: Coord) -> RuntimeResult<CandidateSet> {
        self.ensure_live()?;
        let result = self.query(coord).await;
        self.stall_on_error(result)
    }

    async fn query(&mut self, coord: Coord) -> RuntimeResult<CandidateSet> {
        let request = Envelope::new(self.supervisor.address(), Message::UnassignedRequest { coord })
            .with_reply_to(self.supervisor.clone());
        self.cell(coord).tell(request)?;

        let deadline = Instant::now() + self.config.quiesce_timeout();
        loop {
            let envelope = match timeout_at(deadline, self.inbox.recv()).await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => return Err(RuntimeError::MailboxClosed(self.supervisor.address())),
                Err(_) => {
                    return Err(RuntimeError::Timeout {
                        board: self.id,
                        pending: 1,
                    })
                }
            };
            match &envelope.message {
                Message::UnassignedResponse {
                    coord: answered,
                    candidates,
                } if *answered == coord => return Ok(*candidates),
                Message::UnassignedResponse { .. } => {
                    return Err(RuntimeError::UnexpectedReply {
                        board: self.id,
                        message: envelope.message.to_string(),
                    })
                }
                other => debug!(board = %self.id, message = %other, "ignoring stray reply"),
            }
        }
    }

    /// Fork this board into an independent copy identified by `to`
    ///
    /// Assigned cells are seeded with `CloneAssigned`, open cells with
    /// `CloneUnassigned` carrying a copy of their candidates. The fork shares
    /// nothing with this board afterwards.
    pub async fn fork(&mut self, to: BoardId) -> RuntimeResult<Board> {
        if self.contradicted {
            return Err(RuntimeError::Contradicted(self.id));
        }
        self.ensure_live()?;
        let request = Message::CloneRequest { from: self.id, to };
        info!(%request, assigned = self.grid.assigned_count(), "forking board");

        let mut clone = Board::spawn(to, self.config.clone());
        for coord in Coord::all() {
            let seed = match self.grid.get(coord) {
                Some(assignment) => {
                    clone.grid.set(assignment);
                    Message::CloneAssigned(assignment)
                }
                None => Message::CloneUnassigned {
                    coord,
                    candidates: self.candidates(coord).await?,
                },
            };
            clone
                .cell(coord)
                .tell(Envelope::new(Address::Supervisor(self.id), seed))?;
        }
        Ok(clone)
    }

    /// Stop every cell task and wait for them to finish
    pub async fn shutdown(mut self) {
        self.cells.clear();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(board = %self.id, error = %e, "cell task failed");
            }
        }
        debug!(board = %self.id, "board stopped");
    }

    fn ensure_live(&self) -> RuntimeResult<()> {
        if self.stalled {
            return Err(RuntimeError::Stalled(self.id));
        }
        Ok(())
    }

    fn stall_on_error<T>(&mut self, result: RuntimeResult<T>) -> RuntimeResult<T> {
        if let Err(e) = &result {
            warn!(board = %self.id, error = %e, "board stalled");
            self.stalled = true;
        }
        result
    }

    fn cell(&self, coord: Coord) -> &ActorRef {
        &self.cells[coord.index()]
    }

    fn broadcast(&self, assignment: Assignment) -> RuntimeResult<()> {
        for cell in &self.cells {
            let envelope = Envelope::new(self.supervisor.address(), Message::Assign(assignment))
                .with_reply_to(self.supervisor.clone());
            cell.tell(envelope)?;
        }
        Ok(())
    }

    fn settle(&mut self, wave: &Propagation) {
        let event = match wave.outcome() {
            Outcome::Contradiction => {
                self.contradicted = true;
                info!(board = %self.id, conflicts = wave.conflicts.len(), "board invalid");
                Message::InvalidBoard
            }
            Outcome::Solved => {
                info!(board = %self.id, "board generated");
                Message::Generated
            }
            Outcome::Settled => {
                debug!(
                    board = %self.id,
                    assigned = self.grid.assigned_count(),
                    announced = wave.announced.len(),
                    "wave settled"
                );
                return;
            }
        };
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("id", &self.id)
            .field("assigned", &self.grid.assigned_count())
            .field("contradicted", &self.contradicted)
            .field("stalled", &self.stalled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellmesh_agent::AnnounceRoute;
    use cellmesh_core::Digit;
    use std::time::Duration;

    const SOLUTION: &str = "\
        534678912\
        672195348\
        198342567\
        859761423\
        426853791\
        713924856\
        961537284\
        287419635\
        345286179";

    fn c(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn d(v: u8) -> Digit {
        Digit::new(v).unwrap()
    }

    fn a(row: u8, col: u8, value: u8) -> Assignment {
        Assignment::new(c(row, col), d(value))
    }

    /// The solution with its main diagonal blanked
    fn diagonal_puzzle() -> Grid {
        let mut grid: Grid = SOLUTION.parse().unwrap();
        for i in 1..=9 {
            grid.clear(c(i, i));
        }
        grid
    }

    #[tokio::test]
    async fn test_assign_eliminates_from_peers() {
        let mut board = Board::spawn(BoardId::new(1), RuntimeConfig::default());
        let wave = board.assign(a(1, 1, 5)).await.unwrap();

        assert_eq!(wave.outcome(), Outcome::Settled);
        assert_eq!(wave.replies, CELL_COUNT);
        assert!(wave.announced.is_empty());

        let row_peer = board.candidates(c(1, 9)).await.unwrap();
        assert!(!row_peer.contains(d(5)));
        let unrelated = board.candidates(c(9, 9)).await.unwrap();
        assert_eq!(unrelated, CandidateSet::full());
        let own = board.candidates(c(1, 1)).await.unwrap();
        assert!(own.is_empty());

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_naked_single_is_announced_and_relayed() {
        let mut board = Board::spawn(BoardId::new(2), RuntimeConfig::default());
        let givens = [
            a(1, 2, 2),
            a(1, 3, 3),
            a(2, 1, 4),
            a(3, 1, 5),
            a(2, 2, 6),
            a(2, 3, 7),
            a(3, 2, 8),
            a(3, 3, 9),
        ];

        let mut announced = Vec::new();
        for given in givens {
            let wave = board.assign(given).await.unwrap();
            assert!(!wave.is_contradiction());
            announced.extend(wave.announced);
        }

        assert!(announced.contains(&a(1, 1, 1)));
        assert_eq!(board.grid().get(c(1, 1)), Some(a(1, 1, 1)));
        // the relay reached row peers of (1, 1)
        assert!(!board.candidates(c(1, 9)).await.unwrap().contains(d(1)));

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_seed_solves_by_propagation() {
        let mut board = Board::spawn(BoardId::new(3), RuntimeConfig::default());
        let mut events = board.subscribe();

        let result = board.seed(&diagonal_puzzle()).await.unwrap();

        assert_eq!(result.outcome(), Outcome::Solved);
        assert!(result.announced.len() >= 9);
        assert_eq!(result.given.len() + result.announced.len(), CELL_COUNT);
        assert_eq!(board.grid(), SOLUTION.parse::<Grid>().unwrap());
        assert_eq!(events.recv().await.unwrap(), Message::Generated);

        let stats = board.stats();
        assert_eq!(stats.collapses, result.announced.len() as u64);
        assert_eq!(stats.relayed, stats.collapses);
        assert_eq!(stats.conflicts, 0);

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_seed_solves_with_sender_route() {
        let config = RuntimeConfig::default().with_announce_route(AnnounceRoute::Sender);
        let mut board = Board::spawn(BoardId::new(4), config);

        let result = board.seed(&diagonal_puzzle()).await.unwrap();
        assert_eq!(result.outcome(), Outcome::Solved);

        board.shutdown().await;
    }

    /// Swap a cell's mailbox for one nobody serves
    fn silence(board: &mut Board, coord: Coord) -> mpsc::UnboundedReceiver<Envelope> {
        let (mute, rx) = ActorRef::channel(Address::Cell(board.id, coord));
        board.cells[coord.index()] = mute;
        rx
    }

    #[tokio::test]
    async fn test_timeout_stalls_board() {
        let config = RuntimeConfig::default().with_quiesce_timeout(Duration::from_millis(100));
        let mut board = Board::spawn(BoardId::new(11), config);
        let _muted = silence(&mut board, c(9, 9));

        let err = board.assign(a(1, 1, 5)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Timeout { pending: 1, .. }), "{err}");
        assert!(board.is_stalled());

        // late replies must not be counted by a later wave
        let err = board.assign(a(2, 2, 3)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Stalled(_)));
        let err = board.candidates(c(1, 9)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Stalled(_)));
        let err = board.fork(BoardId::new(12)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Stalled(_)));
        assert_eq!(board.grid().get(c(2, 2)), None);

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_misaddressed_response_is_unexpected() {
        let mut board = Board::spawn(BoardId::new(13), RuntimeConfig::default());
        let _muted = silence(&mut board, c(2, 2));
        board
            .supervisor
            .tell(Envelope::new(
                Address::External,
                Message::UnassignedResponse {
                    coord: c(3, 3),
                    candidates: CandidateSet::full(),
                },
            ))
            .unwrap();

        let err = board.candidates(c(2, 2)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::UnexpectedReply { .. }), "{err}");
        assert!(board.is_stalled());

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_debug_summarizes_board() {
        let mut board = Board::spawn(BoardId::new(14), RuntimeConfig::default());
        board.assign(a(1, 1, 5)).await.unwrap();

        let rendered = format!("{:?}", board);
        assert!(rendered.contains("assigned: 1"), "{rendered}");
        assert!(rendered.contains("stalled: false"), "{rendered}");

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_in_row_is_contradiction() {
        let mut board = Board::spawn(BoardId::new(5), RuntimeConfig::default());
        let mut events = board.subscribe();

        board.assign(a(1, 1, 5)).await.unwrap();
        let wave = board.assign(a(1, 2, 5)).await.unwrap();

        assert_eq!(wave.outcome(), Outcome::Contradiction);
        assert!(!wave.conflicts.is_empty());
        assert!(board.is_contradicted());
        assert_eq!(events.recv().await.unwrap(), Message::InvalidBoard);

        let err = board.fork(BoardId::new(6)).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Contradicted(_)));

        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_fork_is_independent() {
        let mut board = Board::spawn(BoardId::new(7), RuntimeConfig::default());
        board.assign(a(1, 1, 5)).await.unwrap();
        board.assign(a(5, 5, 3)).await.unwrap();

        let mut fork = board.fork(BoardId::new(8)).await.unwrap();
        assert_eq!(fork.id(), BoardId::new(8));
        assert_eq!(fork.grid(), board.grid());
        assert_eq!(
            fork.candidates(c(1, 5)).await.unwrap(),
            board.candidates(c(1, 5)).await.unwrap()
        );

        let wave = fork.assign(a(1, 9, 7)).await.unwrap();
        assert!(!wave.is_contradiction());
        assert!(!fork.candidates(c(1, 5)).await.unwrap().contains(d(7)));
        assert!(board.candidates(c(1, 5)).await.unwrap().contains(d(7)));
        assert_eq!(board.grid().get(c(1, 9)), None);

        fork.shutdown().await;
        board.shutdown().await;
    }

    #[tokio::test]
    async fn test_fork_of_partial_board_finishes() {
        let solution: Grid = SOLUTION.parse().unwrap();
        let top = Grid::from_assignments(solution.assigned().filter(|x| x.coord.row() <= 4));

        let mut board = Board::spawn(BoardId::new(9), RuntimeConfig::default());
        let seeded = board.seed(&top).await.unwrap();
        assert_eq!(seeded.outcome(), Outcome::Settled);

        let mut fork = board.fork(BoardId::new(10)).await.unwrap();
        let mut events = fork.subscribe();
        for given in solution.assigned() {
            if fork.grid().get(given.coord).is_none() {
                let wave = fork.assign(given).await.unwrap();
                assert!(!wave.is_contradiction());
            }
        }

        assert_eq!(fork.grid(), solution);
        assert_eq!(events.recv().await.unwrap(), Message::Generated);
        assert_eq!(board.grid(), top);

        fork.shutdown().await;
        board.shutdown().await;
    }
}
