//! Mesh simulator - 81 cell agents on one thread under chaos delivery
//!
//! Mirrors the runtime board: the supervisor broadcasts every given to all
//! cells and relays every self-assignment it receives. Delivery order comes
//! from a [`ChaosQueue`] with one lane per (sender, receiver) pair.
//!
//! Cells only ever hear from the supervisor, so a sender-routed
//! announcement lands on the supervisor exactly like a parent-routed one.

use cellmesh_agent::{AnnounceRoute, CellAgent, Route};
use cellmesh_core::{Assignment, CandidateSet, Coord, Grid, Message};

use crate::chaos::{ChaosConfig, ChaosQueue, ChaosStats};

/// Participant in a simulated board
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Supervisor,
    Cell(Coord),
}

/// Lane key: (from, to)
pub type Lane = (Node, Node);

/// Outcome of a simulated run
#[derive(Clone, Debug)]
pub struct SimulationReport {
    /// Finalized assignments seen by the supervisor
    pub grid: Grid,
    /// Candidates of every cell at quiescence, indexed by `Coord::index`
    pub candidates: Vec<CandidateSet>,
    /// Reasons carried by `Invalid` replies
    pub conflicts: Vec<String>,
    /// Self-assignments announced by cells
    pub announced: Vec<Assignment>,
    /// Messages delivered to cells and supervisor
    pub deliveries: u64,
    pub chaos: ChaosStats,
}

impl SimulationReport {
    pub fn is_solved(&self) -> bool {
        self.conflicts.is_empty() && self.grid.is_complete()
    }

    pub fn is_contradiction(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn candidates(&self, coord: Coord) -> CandidateSet {
        self.candidates[coord.index()]
    }

    /// Whether two runs reached the same board, ignoring delivery details
    pub fn same_board(&self, other: &SimulationReport) -> bool {
        self.grid == other.grid && self.candidates == other.candidates
    }
}

/// Single-threaded board simulator
pub struct MeshSimulator {
    agents: Vec<CellAgent>,
    queue: ChaosQueue<Lane, Message>,
    grid: Grid,
    conflicts: Vec<String>,
    announced: Vec<Assignment>,
    deliveries: u64,
}

impl MeshSimulator {
    pub fn new(config: ChaosConfig) -> Self {
        Self::with_route(config, AnnounceRoute::default())
    }

    pub fn with_route(config: ChaosConfig, route: AnnounceRoute) -> Self {
        MeshSimulator {
            agents: Coord::all().map(|c| CellAgent::with_route(c, route)).collect(),
            queue: ChaosQueue::new(config),
            grid: Grid::new(),
            conflicts: Vec::new(),
            announced: Vec::new(),
            deliveries: 0,
        }
    }

    /// Calm delivery
    pub fn calm() -> Self {
        Self::new(ChaosConfig::calm())
    }

    /// Hostile delivery
    pub fn hostile(seed: u64) -> Self {
        Self::new(ChaosConfig::hostile().with_seed(seed))
    }

    /// Broadcast every given of `puzzle` at once and deliver until quiescent
    pub fn run(mut self, puzzle: &Grid) -> SimulationReport {
        for given in puzzle.assigned() {
            self.grid.set(given);
            self.broadcast(given);
        }

        while let Some(((from, to), message)) = self.queue.pop() {
            self.deliveries += 1;
            match to {
                Node::Cell(coord) => self.deliver(from, coord, &message),
                Node::Supervisor => self.supervise(message),
            }
        }

        SimulationReport {
            candidates: self.agents.iter().map(CellAgent::candidates).collect(),
            grid: self.grid,
            conflicts: self.conflicts,
            announced: self.announced,
            deliveries: self.deliveries,
            chaos: self.queue.stats().clone(),
        }
    }

    fn broadcast(&mut self, assignment: Assignment) {
        for coord in Coord::all() {
            self.queue
                .push((Node::Supervisor, Node::Cell(coord)), Message::Assign(assignment));
        }
    }

    fn deliver(&mut self, from: Node, coord: Coord, message: &Message) {
        let Some(reply) = self.agents[coord.index()].handle(message) else {
            return;
        };
        let to = match reply.route {
            Route::Sender => from,
            Route::Parent => Node::Supervisor,
        };
        self.queue.push((Node::Cell(coord), to), reply.message);
    }

    fn supervise(&mut self, message: Message) {
        match message {
            Message::Assign(announced) => {
                // duplicated announcements are relayed once
                if self.grid.get(announced.coord) == Some(announced) {
                    return;
                }
                self.announced.push(announced);
                self.grid.set(announced);
                self.broadcast(announced);
            }
            Message::Invalid { reason } => self.conflicts.push(reason),
            _ => {}
        }
    }
}
