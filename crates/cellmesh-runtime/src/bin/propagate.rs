//! cellmesh propagate
//!
//! Seeds a board with a puzzle and runs constraint propagation to quiescence:
//!
//! ```text
//! propagate <puzzle> [config.json]
//! ```
//!
//! The puzzle is 81 cells in row-major order, `1`-`9` for givens and `.` or
//! `0` for blanks. Propagation alone solves only puzzles that fall to naked
//! singles; anything else is printed as far as it got.

use std::env;
use std::fs;

use cellmesh_core::{BoardId, Grid, CELL_COUNT};
use cellmesh_runtime::{init_tracing, Board, Outcome, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(puzzle) = args.next() else {
        eprintln!("usage: propagate <puzzle> [config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => RuntimeConfig::from_json(&fs::read_to_string(path)?)?,
        None => RuntimeConfig::default(),
    };
    init_tracing(&config.log_filter)?;

    let puzzle: Grid = puzzle.parse()?;
    println!("Puzzle ({} givens):", puzzle.assigned_count());
    println!("{}", puzzle);

    let mut board = Board::spawn(BoardId::ZERO, config);
    let result = board.seed(&puzzle).await?;

    println!();
    println!("Board ({} assigned):", board.grid().assigned_count());
    println!("{}", board.grid());
    println!();

    match result.outcome() {
        Outcome::Solved => println!("Solved by propagation."),
        Outcome::Settled => println!(
            "Settled with {} open cells.",
            CELL_COUNT - board.grid().assigned_count()
        ),
        Outcome::Contradiction => {
            println!("Contradiction:");
            for reason in &result.conflicts {
                println!("  {}", reason);
            }
        }
    }

    let stats = board.stats();
    println!(
        "{} messages, {} collapses, {} relayed, {} waves",
        stats.messages_handled, stats.collapses, stats.relayed, stats.waves
    );

    board.shutdown().await;
    Ok(())
}
