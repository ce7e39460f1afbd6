//! Puzzle fixtures shared by tests and benches

use cellmesh_core::{Coord, Grid};

/// A complete, valid board
pub const SOLUTION: &str = "\
    534678912\
    672195348\
    198342567\
    859761423\
    426853791\
    713924856\
    961537284\
    287419635\
    345286179";

/// 30 givens; needs search beyond naked singles to finish
pub const CLASSIC: &str =
    "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";

pub fn solution() -> Grid {
    parse(SOLUTION)
}

pub fn classic() -> Grid {
    parse(CLASSIC)
}

/// The solution with its main diagonal blanked; solved by naked singles
pub fn diagonal() -> Grid {
    let mut grid = solution();
    for coord in Coord::all().filter(|c| c.row() == c.col()) {
        grid.clear(coord);
    }
    grid
}

/// The first `rows` rows of the solution
pub fn top_rows(rows: u8) -> Grid {
    Grid::from_assignments(solution().assigned().filter(|a| a.coord.row() <= rows))
}

fn parse(text: &str) -> Grid {
    match text.parse() {
        Ok(grid) => grid,
        Err(e) => panic!("bad fixture: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures() {
        assert!(solution().is_complete());
        assert_eq!(classic().assigned_count(), 30);
        assert_eq!(diagonal().assigned_count(), 72);
        assert_eq!(top_rows(3).assigned_count(), 27);
    }
}
