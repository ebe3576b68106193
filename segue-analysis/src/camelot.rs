//! Camelot wheel notation for harmonic mixing
//!
//! Keys are labelled 1A-12B: numbers walk the circle of fifths, 'A' marks
//! minor and 'B' major, and a relative major/minor pair shares its number.
//! Adjacent labels are harmonically compatible, which is what the planner
//! checks before committing to a key-sensitive transition.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A position on the Camelot wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CamelotKey {
    /// Wheel position, 1-12
    pub number: u8,
    /// true = 'B' (major), false = 'A' (minor)
    pub is_major: bool,
}

/// Wheel numbers for major keys, indexed by pitch class (0 = A, 1 = Bb, ...).
const MAJOR_WHEEL: [u8; 12] = [11, 6, 1, 8, 3, 10, 5, 12, 7, 2, 9, 4];

/// Wheel numbers for minor keys, same pitch-class indexing.
const MINOR_WHEEL: [u8; 12] = [8, 3, 10, 5, 12, 7, 2, 9, 4, 11, 6, 1];

impl CamelotKey {
    /// Create a key, rejecting wheel numbers outside 1-12.
    pub fn new(number: u8, is_major: bool) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self { number, is_major })
    }

    /// Look up the key for a pitch class (semitones above A, 0-11).
    ///
    /// The two 12-entry tables together form the full 24-key mapping; the
    /// minor half carries the relative-minor numbering so that e.g. pitch
    /// class 3 (C) maps to 8B major and pitch class 0 (A) to 8A minor.
    pub fn from_pitch_class(pitch_class: u8, minor: bool) -> Self {
        let pc = (pitch_class % 12) as usize;
        let number = if minor { MINOR_WHEEL[pc] } else { MAJOR_WHEEL[pc] };
        Self { number, is_major: !minor }
    }

    /// Parse "8A" / "12B" style labels.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let last = s.chars().last()?;
        let is_major = match last.to_ascii_uppercase() {
            'B' => true,
            'A' => false,
            _ => return None,
        };
        let number: u8 = s[..s.len() - 1].parse().ok()?;
        Self::new(number, is_major)
    }

    /// Harmonic compatibility for mixing: the same key, the relative
    /// major/minor (same number, other letter), or an adjacent number in
    /// the same mode. The wheel wraps, so 12 and 1 are adjacent.
    pub fn is_compatible(&self, other: &CamelotKey) -> bool {
        if self.number == other.number {
            return true;
        }
        if self.is_major == other.is_major {
            let diff = (self.number as i8 - other.number as i8).abs();
            return diff == 1 || diff == 11;
        }
        false
    }

    /// Circular distance between wheel numbers, ignoring mode.
    ///
    /// The planner uses this to decide whether a one-step pitch correction
    /// could reconcile two incompatible keys.
    pub fn wheel_distance(&self, other: &CamelotKey) -> u8 {
        let d = (self.number as i8 - other.number as i8).abs();
        d.min(12 - d) as u8
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, if self.is_major { 'B' } else { 'A' })
    }
}

impl FromStr for CamelotKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

impl Serialize for CamelotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
