//! Core data structures for line statistics

use serde::Serialize;
use std::ops::{Add, AddAssign};

/// Line counts for one file (or a sum of files).
///
/// Only total, comment and blank lines are measured. Code lines are the
/// residual, so `total == comment + blank + code` holds for every value
/// built through [`LineCounts::new`] or summed with `+`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineCounts {
    total_lines: u64,
    comment_lines: u64,
    code_lines: u64,
    blank_lines: u64,
}

impl LineCounts {
    /// Build counts from the three measured quantities.
    ///
    /// Comment and blank lines are clamped so that they never exceed the
    /// total between them.
    pub fn new(total_lines: u64, comment_lines: u64, blank_lines: u64) -> Self {
        let comment_lines = comment_lines.min(total_lines);
        let blank_lines = blank_lines.min(total_lines - comment_lines);
        Self {
            total_lines,
            comment_lines,
            code_lines: total_lines - blank_lines - comment_lines,
            blank_lines,
        }
    }

    /// All lines in the file
    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }

    /// Lines inside or opening a `<!-- -->` comment
    pub fn comment_lines(&self) -> u64 {
        self.comment_lines
    }

    /// Lines that are neither comment nor blank
    pub fn code_lines(&self) -> u64 {
        self.code_lines
    }

    /// Whitespace-only lines
    pub fn blank_lines(&self) -> u64 {
        self.blank_lines
    }

    /// True when no line was seen
    pub fn is_empty(&self) -> bool {
        self.total_lines == 0
    }
}

impl Add for LineCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total_lines: self.total_lines + other.total_lines,
            comment_lines: self.comment_lines + other.comment_lines,
            code_lines: self.code_lines + other.code_lines,
            blank_lines: self.blank_lines + other.blank_lines,
        }
    }
}

impl AddAssign for LineCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for LineCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| acc + c)
    }
}
