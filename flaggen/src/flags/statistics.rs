// SPDX-License-Identifier: GPL-3.0-or-later

//! Counters of a transcript scan.
//!
//! Every scanned line ends up in exactly one bucket: either it was used as a
//! source of flags, or it was skipped.

use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    /// Number of lines which contributed to the result.
    pub qualifying: usize,
    /// Number of lines which were discarded.
    pub skipped: usize,
}

impl ScanStatistics {
    pub fn total(&self) -> usize {
        self.qualifying + self.skipped
    }
}

impl fmt::Display for ScanStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transcript scan:")?;
        writeln!(f, "  lines scanned: {}", self.total())?;
        writeln!(f, "  relevant entries: {}", self.qualifying)?;
        write!(f, "  discarded entries: {}", self.skipped)
    }
}
