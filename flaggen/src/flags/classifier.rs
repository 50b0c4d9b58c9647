// SPDX-License-Identifier: GPL-3.0-or-later

//! Decides what a transcript line is.
//!
//! The build transcript contains everything the build tool would run: compiler
//! calls, but also archivers, linkers, code generators and shell plumbing.
//! The classifier drops lines which are known not to be a complete
//! compilation of a tracked file. For compilation databases it also
//! recognizes the compiler driver, which determines the language family.

use super::patterns;
use std::fmt;

/// Compiler family of a recognized invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompilerFamily {
    C,
    Cxx,
}

impl CompilerFamily {
    /// The compiler name written as the first argument of the database entry.
    pub fn compiler_name(&self) -> &'static str {
        match self {
            CompilerFamily::C => "cc",
            CompilerFamily::Cxx => "c++",
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerFamily::C => write!(f, "c"),
            CompilerFamily::Cxx => write!(f, "c++"),
        }
    }
}

/// The classification of a single transcript line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// The line matched one of the skip rules.
    Skipped,
    /// The line is worth scanning for flags.
    Qualifying,
}

/// Applies the skip rules common to both scan variants.
pub fn classify(line: &str) -> Classification {
    if patterns::is_skipped_line(line) {
        Classification::Skipped
    } else {
        Classification::Qualifying
    }
}

/// Recognizes the compiler driver at the start of the tokenized line.
///
/// A compiler wrapper (like `ccache`) in the first position is looked through,
/// and the next token is taken as the compiler.
pub fn compiler_family(tokens: &[String]) -> Option<CompilerFamily> {
    let mut candidates = tokens.iter();
    let mut executable = candidates.next()?;
    if patterns::is_compiler_wrapper(executable) {
        executable = candidates.next()?;
    }

    if patterns::is_cxx_compiler(executable) {
        Some(CompilerFamily::Cxx)
    } else if patterns::is_c_compiler(executable) {
        Some(CompilerFamily::C)
    } else {
        None
    }
}

/// Returns the first token which looks like a C/C++ source file.
pub fn source_file(tokens: &[String]) -> Option<&str> {
    tokens.iter().skip(1).map(String::as_str).find(|token| patterns::looks_like_a_source_file(token))
}
