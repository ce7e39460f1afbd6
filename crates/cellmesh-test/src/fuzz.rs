//! Agent fuzzer - random assignment streams against a single cell agent
//!
//! Checks, per stream:
//! - One reply per delivered assignment
//! - Candidates never grow
//! - At most one self-announcement
//! - Redelivery does not change the outcome
//! - Delivery order does not change a conflict-free outcome

use cellmesh_agent::CellAgent;
use cellmesh_core::{Assignment, CandidateSet, Coord, Digit, Message};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of independent streams
    pub rounds: usize,
    /// Assignments per stream
    pub stream_len: usize,
    /// Probability that an assignment targets a peer of the cell (0.0 - 1.0)
    pub peer_bias: f64,
    /// Probability that an assignment targets the cell itself (0.0 - 1.0)
    pub own_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            rounds: 200,
            stream_len: 24,
            peer_bias: 0.7,
            own_prob: 0.05,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            rounds: 50,
            stream_len: 12,
            ..FuzzerConfig::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            rounds: 2_000,
            stream_len: 40,
            peer_bias: 0.8,
            own_prob: 0.1,
            seed: 42,
        }
    }
}

/// What one stream did to an agent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamOutcome {
    pub candidates: CandidateSet,
    pub assigned: Option<Digit>,
    pub replies: usize,
    pub announcements: usize,
    pub conflicts: usize,
    /// Whether some reply found the candidates larger than before
    pub grew: bool,
}

impl StreamOutcome {
    pub fn same_state(&self, other: &StreamOutcome) -> bool {
        self.candidates == other.candidates && self.assigned == other.assigned
    }
}

/// Deliver `stream` to a fresh agent for `coord`
pub fn drive(coord: Coord, stream: &[Assignment]) -> StreamOutcome {
    let mut agent = CellAgent::new(coord);
    let mut outcome = StreamOutcome {
        candidates: agent.candidates(),
        assigned: None,
        replies: 0,
        announcements: 0,
        conflicts: 0,
        grew: false,
    };

    for assignment in stream {
        let before = agent.candidates();
        let reply = agent.handle(&Message::Assign(*assignment));
        let after = agent.candidates();
        if after.iter().any(|d| !before.contains(d)) {
            outcome.grew = true;
        }

        match reply.map(|out| out.message) {
            Some(Message::Assign(a)) if a.coord == coord => {
                outcome.replies += 1;
                outcome.announcements += 1;
            }
            Some(Message::Invalid { .. }) => {
                outcome.replies += 1;
                outcome.conflicts += 1;
            }
            Some(_) => outcome.replies += 1,
            None => {}
        }
    }

    outcome.candidates = agent.candidates();
    outcome.assigned = agent.assigned();
    outcome
}

/// Fuzzing result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuzzResult {
    pub rounds: usize,
    pub messages: usize,
    pub reply_violations: u32,
    pub growth_violations: u32,
    pub announcement_violations: u32,
    pub idempotence_violations: u32,
    pub order_violations: u32,
    /// Rounds where order was not compared because a conflict occurred
    pub conflicting_rounds: usize,
}

impl FuzzResult {
    pub fn is_valid(&self) -> bool {
        self.reply_violations == 0
            && self.growth_violations == 0
            && self.announcement_violations == 0
            && self.idempotence_violations == 0
            && self.order_violations == 0
    }
}

/// Agent fuzzer
pub struct AgentFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
}

impl AgentFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        AgentFuzzer {
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Random cell and a stream of assignments aimed at it
    pub fn generate(&mut self) -> (Coord, Vec<Assignment>) {
        let all: Vec<Coord> = Coord::all().collect();
        let coord = all[self.rng.gen_range(0..all.len())];
        let peers: Vec<Coord> = coord.peers().collect();

        let stream = (0..self.config.stream_len)
            .map(|_| {
                let roll = self.rng.gen::<f64>();
                let target = if roll < self.config.own_prob {
                    coord
                } else if roll < self.config.own_prob + self.config.peer_bias {
                    peers[self.rng.gen_range(0..peers.len())]
                } else {
                    all[self.rng.gen_range(0..all.len())]
                };
                Assignment::new(target, Digit::ALL[self.rng.gen_range(0..Digit::ALL.len())])
            })
            .collect();

        (coord, stream)
    }

    /// Run the fuzzer
    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();

        for _ in 0..self.config.rounds {
            let (coord, stream) = self.generate();
            result.rounds += 1;
            result.messages += stream.len();

            let once = drive(coord, &stream);
            if once.replies != stream.len() {
                result.reply_violations += 1;
            }
            if once.grew {
                result.growth_violations += 1;
            }
            if once.announcements > 1 {
                result.announcement_violations += 1;
            }

            let twice: Vec<Assignment> = stream.iter().flat_map(|a| [*a, *a]).collect();
            if !drive(coord, &twice).same_state(&once) {
                result.idempotence_violations += 1;
            }

            let mut shuffled = stream.clone();
            shuffled.shuffle(&mut self.rng);
            let other = drive(coord, &shuffled);
            if once.conflicts > 0 || other.conflicts > 0 {
                result.conflicting_rounds += 1;
            } else if !other.same_state(&once) {
                result.order_violations += 1;
            }
        }

        result
    }
}
