//! End-to-end integration checks
//!
//! Runs one puzzle through a live runtime board and through the simulator
//! and compares where each settled:
//! - Finalized grid
//! - Candidates of every open cell
//! - Outcome (settled, solved, contradiction)

use cellmesh_core::{BoardId, CandidateSet, Coord, Grid};
use cellmesh_runtime::{Board, Outcome, RuntimeConfig, RuntimeResult};

use crate::chaos::ChaosConfig;
use crate::simulator::{MeshSimulator, SimulationReport};

// ============================================================================
// CONFIG
// ============================================================================

/// Integration run configuration
#[derive(Clone, Debug, Default)]
pub struct IntegrationConfig {
    pub runtime: RuntimeConfig,
    pub chaos: ChaosConfig,
}

impl IntegrationConfig {
    /// Default runtime, hostile simulator
    pub fn hostile(seed: u64) -> Self {
        IntegrationConfig {
            runtime: RuntimeConfig::default(),
            chaos: ChaosConfig::hostile().with_seed(seed),
        }
    }

    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Both sides of a cross-check
#[derive(Clone, Debug)]
pub struct CrossCheck {
    pub board_grid: Grid,
    pub board_candidates: Vec<CandidateSet>,
    pub board_outcome: Outcome,
    pub simulated: SimulationReport,
}

impl CrossCheck {
    /// Cells whose candidates differ between board and simulator
    pub fn divergent_cells(&self) -> Vec<Coord> {
        Coord::all()
            .filter(|c| self.board_candidates[c.index()] != self.simulated.candidates(*c))
            .collect()
    }

    pub fn agrees(&self) -> bool {
        let outcome_agrees = match self.board_outcome {
            Outcome::Contradiction => self.simulated.is_contradiction(),
            Outcome::Solved => self.simulated.is_solved(),
            Outcome::Settled => {
                !self.simulated.is_contradiction() && !self.simulated.grid.is_complete()
            }
        };
        outcome_agrees && self.board_grid == self.simulated.grid && self.divergent_cells().is_empty()
    }
}

/// Seed a fresh runtime board and a simulator with `puzzle` and compare
///
/// Only meaningful for puzzles that do not contradict themselves: a board
/// stops seeding at the first contradiction while the simulator delivers
/// every given.
pub async fn cross_check(puzzle: &Grid, config: IntegrationConfig) -> RuntimeResult<CrossCheck> {
    let mut board = Board::spawn(BoardId::new(1), config.runtime);
    let propagation = board.seed(puzzle).await?;

    let mut board_candidates = Vec::with_capacity(Coord::all().count());
    for coord in Coord::all() {
        board_candidates.push(board.candidates(coord).await?);
    }
    let board_grid = board.grid();
    board.shutdown().await;

    Ok(CrossCheck {
        board_grid,
        board_candidates,
        board_outcome: propagation.outcome(),
        simulated: MeshSimulator::new(config.chaos).run(puzzle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles;
    use cellmesh_agent::AnnounceRoute;

    #[tokio::test]
    async fn test_diagonal_agrees() {
        let check = cross_check(&puzzles::diagonal(), IntegrationConfig::hostile(5))
            .await
            .unwrap();
        assert_eq!(check.board_outcome, Outcome::Solved);
        assert!(check.agrees(), "divergent: {:?}", check.divergent_cells());
    }

    #[tokio::test]
    async fn test_partial_board_agrees() {
        let check = cross_check(&puzzles::top_rows(4), IntegrationConfig::hostile(11))
            .await
            .unwrap();
        assert_eq!(check.board_outcome, Outcome::Settled);
        assert!(check.agrees(), "divergent: {:?}", check.divergent_cells());
    }

    #[tokio::test]
    async fn test_classic_agrees() {
        let check = cross_check(&puzzles::classic(), IntegrationConfig::hostile(2))
            .await
            .unwrap();
        assert_ne!(check.board_outcome, Outcome::Contradiction);
        assert!(check.agrees(), "divergent: {:?}", check.divergent_cells());
    }

    #[tokio::test]
    async fn test_sender_route_agrees() {
        let config = IntegrationConfig::hostile(3).with_runtime(
            RuntimeConfig::default().with_announce_route(AnnounceRoute::Sender),
        );
        let check = cross_check(&puzzles::diagonal(), config).await.unwrap();
        assert!(check.agrees());
    }
}
