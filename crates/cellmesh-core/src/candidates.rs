//! Candidate sets and assignments

use std::fmt;

use crate::{Coord, Digit};

const FULL_MASK: u16 = 0b1_1111_1111;

/// Digits still believed possible for one cell
///
/// Bit `d - 1` is set when digit `d` is a candidate. Copies are cheap,
/// so every message that carries a candidate set carries its own copy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CandidateSet(u16);

impl CandidateSet {
    /// All nine digits
    #[inline]
    pub const fn full() -> Self {
        CandidateSet(FULL_MASK)
    }

    #[inline]
    pub const fn empty() -> Self {
        CandidateSet(0)
    }

    #[inline]
    fn bit(digit: Digit) -> u16 {
        1 << (digit.get() - 1)
    }

    #[inline]
    pub fn contains(self, digit: Digit) -> bool {
        self.0 & Self::bit(digit) != 0
    }

    /// Remove a digit, returning whether it was present
    ///
    /// Removing an absent digit is a no-op.
    #[inline]
    pub fn remove(&mut self, digit: Digit) -> bool {
        let present = self.contains(digit);
        self.0 &= !Self::bit(digit);
        present
    }

    /// Keep only the digits present in both sets
    #[inline]
    pub fn intersect(&mut self, other: CandidateSet) {
        self.0 &= other.0;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The remaining digit when exactly one is left
    pub fn single(self) -> Option<Digit> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Digits in ascending order
    pub fn iter(self) -> impl Iterator<Item = Digit> {
        Digit::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Raw bitmask, bit `d - 1` for digit `d`
    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }
}

impl FromIterator<Digit> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Digit>>(iter: I) -> Self {
        CandidateSet(iter.into_iter().fold(0, |acc, d| acc | Self::bit(d)))
    }
}

impl fmt::Debug for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidates{}", self)
    }
}

impl fmt::Display for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, digit) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", digit)?;
        }
        write!(f, "]")
    }
}

/// A cell fixed to a digit, finally and irrevocably
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub coord: Coord,
    pub digit: Digit,
}

impl Assignment {
    #[inline]
    pub fn new(coord: Coord, digit: Digit) -> Self {
        Assignment { coord, digit }
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assignment[{} = {}]", self.coord, self.digit)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.coord, self.digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: u8) -> Digit {
        Digit::new(v).unwrap()
    }

    #[test]
    fn test_full_and_empty() {
        assert_eq!(CandidateSet::full().len(), 9);
        assert!(CandidateSet::empty().is_empty());
        assert_eq!(CandidateSet::default(), CandidateSet::empty());
        assert_eq!(CandidateSet::full().to_string(), "[1, 2, 3, 4, 5, 6, 7, 8, 9]");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut set = CandidateSet::full();
        assert!(set.remove(d(4)));
        assert!(!set.remove(d(4)));
        assert_eq!(set.len(), 8);
        assert!(!set.contains(d(4)));
    }

    #[test]
    fn test_single() {
        let mut set = CandidateSet::full();
        for v in 2..=9 {
            set.remove(d(v));
        }
        assert_eq!(set.single(), Some(d(1)));

        set.remove(d(1));
        assert_eq!(set.single(), None);
        assert_eq!(set.to_string(), "[]");
    }

    #[test]
    fn test_intersect_never_grows() {
        let mut set: CandidateSet = [d(1), d(2), d(3)].into_iter().collect();
        set.intersect([d(3), d(4), d(5)].into_iter().collect());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![d(3)]);

        set.intersect(CandidateSet::full());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_assignment_equality() {
        let coord = Coord::new(2, 3).unwrap();
        let a = Assignment::new(coord, d(5));
        assert_eq!(a, Assignment::new(coord, d(5)));
        assert_ne!(a, Assignment::new(coord, d(6)));
        assert_ne!(a, Assignment::new(Coord::new(3, 2).unwrap(), d(5)));
        assert_eq!(a.to_string(), "(2, 3) = 5");
    }
}
