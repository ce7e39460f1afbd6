//! Grid snapshot - a passive 9x9 view of finalized assignments
//!
//! The grid never checks Sudoku legality. Legality is established by the
//! propagation protocol before assignments are collected here.

use std::fmt;
use std::str::FromStr;

use crate::{Assignment, CoreError, CoreResult, Coord, Digit, CELL_COUNT};

const RULE: &str = "-------------------------------------";

/// 9x9 mapping from coordinate to an optional assigned digit
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[Option<Digit>; 9]; 9],
}

impl Grid {
    pub fn new() -> Self {
        Grid::default()
    }

    /// Build a grid from a set of assignments; later entries win
    pub fn from_assignments<I: IntoIterator<Item = Assignment>>(assignments: I) -> Self {
        let mut grid = Grid::new();
        for assignment in assignments {
            grid.set(assignment);
        }
        grid
    }

    /// Store an assignment, overwriting anything at that position
    pub fn set(&mut self, assignment: Assignment) {
        let coord = assignment.coord;
        self.cells[coord.row() as usize - 1][coord.col() as usize - 1] = Some(assignment.digit);
    }

    /// Assignment recorded at a position, if any
    pub fn get(&self, coord: Coord) -> Option<Assignment> {
        self.cells[coord.row() as usize - 1][coord.col() as usize - 1]
            .map(|digit| Assignment::new(coord, digit))
    }

    pub fn clear(&mut self, coord: Coord) {
        self.cells[coord.row() as usize - 1][coord.col() as usize - 1] = None;
    }

    /// Recorded assignments in row-major order
    pub fn assigned(&self) -> impl Iterator<Item = Assignment> + '_ {
        Coord::all().filter_map(move |coord| self.get(coord))
    }

    pub fn assigned_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count() == CELL_COUNT
    }
}

impl FromStr for Grid {
    type Err = CoreError;

    /// Parse 81 cells in row-major order; `.` or `0` mark a blank.
    /// Whitespace and `|`/`-`/`+` separators are ignored.
    fn from_str(s: &str) -> CoreResult<Self> {
        let mut grid = Grid::new();
        let mut index = 0;

        for ch in s.chars() {
            if ch.is_whitespace() || matches!(ch, '|' | '-' | '+') {
                continue;
            }
            if index >= CELL_COUNT {
                return Err(CoreError::GridParse(format!(
                    "more than {} cells",
                    CELL_COUNT
                )));
            }
            match ch {
                '.' | '0' => {}
                '1'..='9' => {
                    let coord = Coord::from_index(index)?;
                    let digit = Digit::new(ch as u8 - b'0')?;
                    grid.set(Assignment::new(coord, digit));
                }
                other => {
                    return Err(CoreError::GridParse(format!(
                        "unexpected character {:?} at cell {}",
                        other, index
                    )))
                }
            }
            index += 1;
        }

        if index != CELL_COUNT {
            return Err(CoreError::GridParse(format!(
                "expected {} cells, found {}",
                CELL_COUNT, index
            )));
        }
        Ok(grid)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("assigned", &self.assigned_count())
            .finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            writeln!(f, "{}", RULE)?;
            for cell in row {
                match cell {
                    Some(digit) => write!(f, "| {} ", digit)?,
                    None => write!(f, "|   ")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{}", RULE)
    }
}
