//! Board positions, digits and the peer relation
//!
//! Rows, columns, boxes and digits are all 1-based, matching how a
//! board is read by people. The box index and peer relation are pure
//! functions of two coordinates and are never cached.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Side length of the board
pub const BOARD_SIZE: u8 = 9;

/// Side length of a box
pub const BOX_SIZE: u8 = 3;

/// Number of cells on a board
pub const CELL_COUNT: usize = 81;

/// Number of peers of every cell (8 row + 8 column + 4 remaining box cells)
pub const PEER_COUNT: usize = 20;

/// A digit in `1..=9`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digit(u8);

impl Digit {
    /// All nine digits in ascending order
    pub const ALL: [Digit; 9] = [
        Digit(1),
        Digit(2),
        Digit(3),
        Digit(4),
        Digit(5),
        Digit(6),
        Digit(7),
        Digit(8),
        Digit(9),
    ];

    pub fn new(value: u8) -> CoreResult<Self> {
        if (1..=BOARD_SIZE).contains(&value) {
            Ok(Digit(value))
        } else {
            Err(CoreError::DigitOutOfRange(value))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Digit {
    type Error = CoreError;

    fn try_from(value: u8) -> CoreResult<Self> {
        Digit::new(value)
    }
}

impl fmt::Debug for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digit({})", self.0)
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cell coordinate, `(row, col)` with both in `1..=9`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> CoreResult<Self> {
        if (1..=BOARD_SIZE).contains(&row) && (1..=BOARD_SIZE).contains(&col) {
            Ok(Coord { row, col })
        } else {
            Err(CoreError::CoordOutOfRange { row, col })
        }
    }

    /// Coordinate for a row-major cell index in `0..81`
    pub fn from_index(index: usize) -> CoreResult<Self> {
        if index >= CELL_COUNT {
            return Err(CoreError::CoordOutOfRange {
                row: (index / 9 + 1).min(u8::MAX as usize) as u8,
                col: (index % 9 + 1) as u8,
            });
        }
        Ok(Coord {
            row: (index / 9) as u8 + 1,
            col: (index % 9) as u8 + 1,
        })
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Row-major index in `0..81`
    #[inline]
    pub fn index(self) -> usize {
        (self.row as usize - 1) * 9 + (self.col as usize - 1)
    }

    /// Box index in `1..=9`, numbered left to right, top to bottom
    #[inline]
    pub fn box_index(self) -> u8 {
        let box_row = (self.row - 1) / BOX_SIZE + 1;
        let box_col = (self.col - 1) / BOX_SIZE + 1;
        (box_row - 1) * BOX_SIZE + box_col
    }

    #[inline]
    pub fn shares_row(self, other: Coord) -> bool {
        self.row == other.row
    }

    #[inline]
    pub fn shares_col(self, other: Coord) -> bool {
        self.col == other.col
    }

    #[inline]
    pub fn shares_box(self, other: Coord) -> bool {
        self.box_index() == other.box_index()
    }

    /// Two distinct cells sharing a row, column or box
    #[inline]
    pub fn is_peer(self, other: Coord) -> bool {
        self != other && (self.shares_row(other) || self.shares_col(other) || self.shares_box(other))
    }

    /// All 81 coordinates in row-major order
    pub fn all() -> impl Iterator<Item = Coord> {
        (1..=BOARD_SIZE).flat_map(|row| (1..=BOARD_SIZE).map(move |col| Coord { row, col }))
    }

    /// The 20 peers of this cell in row-major order
    pub fn peers(self) -> impl Iterator<Item = Coord> {
        Coord::all().filter(move |other| self.is_peer(*other))
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord({}, {})", self.row, self.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board identity - the "board ref" carried by clone requests
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoardId(pub u64);

impl BoardId {
    pub const ZERO: BoardId = BoardId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        BoardId(id)
    }

    /// Next identity in sequence, used when forking
    #[inline]
    pub fn next(self) -> Self {
        BoardId(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.0)
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "board-{}", self.0)
    }
}
