// SPDX-License-Identifier: GPL-3.0-or-later

//! This module declares the file formats produced by this project.
//! The following formats are declared:
//!
//! - The JSON compilation database format, as declared by the Clang project.
//! - The YouCompleteMe configuration (see the `ycm` module).
//! - The color_coded flag listing (see the `color_coded` module).

use super::{clang, json};
use thiserror::Error;

/// Represents errors that can occur while writing file formats.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Generic IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("Format semantic error: {0}")]
    Semantic(#[from] clang::EntryError),
}

/// A trait representing a file format that can be written.
///
/// File formats in this project are sequences of values. This trait
/// provides a type-independent abstraction over file formats.
pub trait SerializationFormat<T> {
    /// Writes an iterator of items to the specified writer.
    fn write(writer: impl std::io::Write, items: impl Iterator<Item = T>) -> Result<(), SerializationError>;
}

/// The type represents a JSON compilation database format.
///
/// The format is a JSON array format, which is a sequence of JSON objects
/// enclosed in square brackets. Each object represents a compilation
/// command.
///
/// # Note
/// The format itself is defined in the LLVM project documentation.
/// https://clang.llvm.org/docs/JSONCompilationDatabase.html
pub struct JsonCompilationDatabase;

impl SerializationFormat<clang::Entry> for JsonCompilationDatabase {
    fn write(
        writer: impl std::io::Write,
        entries: impl Iterator<Item = clang::Entry>,
    ) -> Result<(), SerializationError> {
        json::serialize_result_seq(
            writer,
            // Ensure only valid entries are serialized.
            entries.map(|entry| entry.validate().map_err(SerializationError::Semantic)),
        )
    }
}
