//! Numeric range matching for protocol and port fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`.
///
/// The numeric domain (8-bit protocol, 16-bit port) is a caller convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub min: u16,
    pub max: u16,
}

impl Range {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Range holding exactly one value
    pub const fn single(value: u16) -> Self {
        Self::new(value, value)
    }

    /// Check whether `value` lies inside the interval
    pub fn contains(&self, value: u16) -> bool {
        self.min <= value && value <= self.max
    }

    /// `min <= max`. An inverted range contains nothing.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Union of ranges for one packet field. Empty means "any value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeSet {
    ranges: Vec<Range>,
}

impl RangeSet {
    /// Wildcard set
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }

    pub fn push(&mut self, range: Range) {
        self.ranges.push(range);
    }

    /// True if the set is the wildcard or any member range contains `value`.
    pub fn matches(&self, value: u16) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(|r| r.contains(value))
    }

    pub fn is_wildcard(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub(crate) fn first_invalid(&self) -> Option<Range> {
        self.ranges.iter().copied().find(|r| !r.is_valid())
    }
}

impl From<Vec<Range>> for RangeSet {
    fn from(ranges: Vec<Range>) -> Self {
        Self::new(ranges)
    }
}

impl FromIterator<Range> for RangeSet {
    fn from_iter<I: IntoIterator<Item = Range>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
