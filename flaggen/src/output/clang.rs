// SPDX-License-Identifier: GPL-3.0-or-later

//! This module provides support for writing JSON compilation database files.
//!
//! A compilation database is a set of records which describe the compilation of the
//! source files in a given project. It describes the compiler invocation command to
//! compile a source module to an object file.
//!
//! The definition of the JSON compilation database files is done in the LLVM project
//! [documentation](https://clang.llvm.org/docs/JSONCompilationDatabase.html).

use serde::{Deserialize, Serialize};
use std::path;
use thiserror::Error;

/// Represents an entry of the compilation database.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The working directory of the compilation. All paths specified in the `arguments`
    /// or `file` fields must be either absolute or relative to this directory.
    pub directory: path::PathBuf,
    /// The main translation unit source processed by this compilation step.
    /// This is used by tools as the key into the compilation database.
    pub file: path::PathBuf,
    /// The compile command argv as list of strings. `arguments[0]` is the compiler
    /// name, followed by the flags which are relevant for the editor tooling.
    pub arguments: Vec<String>,
}

impl Entry {
    pub fn new(
        file: impl Into<path::PathBuf>,
        arguments: Vec<String>,
        directory: impl Into<path::PathBuf>,
    ) -> Self {
        Entry { directory: directory.into(), file: file.into(), arguments }
    }

    /// Semantic validation of the entry. Checking all fields for
    /// valid values and formats.
    pub fn validate(self) -> Result<Self, EntryError> {
        if self.file.to_string_lossy().is_empty() {
            return Err(EntryError::EmptyFileName);
        }
        if self.directory.to_string_lossy().is_empty() {
            return Err(EntryError::EmptyDirectory);
        }
        if self.arguments.is_empty() {
            return Err(EntryError::ArgumentsAreMissing);
        }
        Ok(self)
    }
}

/// Represents the possible errors that can occur when validating an entry.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Entry has an empty file field")]
    EmptyFileName,
    #[error("Entry has an empty directory field")]
    EmptyDirectory,
    #[error("Entry has no arguments")]
    ArgumentsAreMissing,
}
