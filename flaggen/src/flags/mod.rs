// SPDX-License-Identifier: GPL-3.0-or-later

//! This module mines compiler flags from a build transcript.
//!
//! The pipeline is strictly sequential. Every transcript line goes through
//! the same steps:
//!
//! - `classifier`: decides whether the line is skipped, and (for compilation
//!   databases) which compiler family the invocation belongs to.
//! - `tokenizer`: splits the line into quote-aware argument tokens.
//! - `filter`: applies the inclusion policy, resolves path-bearing options
//!   against the prefix root and records macro definitions.
//! - `aggregate`: folds the accepted flags of every line into the final result,
//!   either a flat flag set or a list of compilation database entries.
//!
//! The pattern sets used by these steps are compiled once, see `patterns`.

pub mod aggregate;
pub mod classifier;
pub mod filter;
pub mod patterns;
pub mod statistics;
pub mod tokenizer;

use std::fmt;

pub use aggregate::{Aggregator, Database, DatabaseAggregator, FlagSet, FlagSetAggregator, MacroConflict};
pub use statistics::ScanStatistics;

/// A compiler argument which passed the inclusion policy.
///
/// Some options take their value as a separate token. Those travel together
/// with their (already resolved) path argument, so the emitters can render
/// them as a unit.
///
/// The derived ordering puts bare flags before option/path pairs, and
/// compares the strings lexicographically within a variant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
    Bare(String),
    WithPath { option: String, path: String },
}

impl Flag {
    pub fn bare(flag: impl Into<String>) -> Self {
        Flag::Bare(flag.into())
    }

    pub fn with_path(option: impl Into<String>, path: impl Into<String>) -> Self {
        Flag::WithPath { option: option.into(), path: path.into() }
    }

    /// Returns the command line arguments this flag stands for.
    pub fn as_arguments(&self) -> Vec<&str> {
        match self {
            Flag::Bare(flag) => vec![flag.as_str()],
            Flag::WithPath { option, path } => vec![option.as_str(), path.as_str()],
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Bare(flag) => write!(f, "{flag}"),
            Flag::WithPath { option, path } => write!(f, "{option} {path}"),
        }
    }
}

/// The two output granularities of the scan.
///
/// They share the pipeline, but differ in the inclusion policy: only the flag
/// set collects word-size flags and deduplicates macro definitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Variant {
    FlagSet,
    Database,
}
