// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for writing the output files.
//!
//! Three formats are supported. Two of them (YouCompleteMe and color_coded)
//! are written from the flag set, while the JSON compilation database is
//! written from the per-file entries. Every file is written atomically.
//!
//! The `OutputWriter` struct represents the main entry point for writing output.

pub mod clang;
mod color_coded;
mod formats;
mod json;
mod writers;
mod ycm;

use crate::flags::{Flag, Variant};
use clang::Entry;
use color_coded::ColorCodedConfiguration;
use formats::JsonCompilationDatabase;
use std::io::{BufRead, Write};
use std::{fmt, io, path};
use thiserror::Error;
use writers::{AtomicFileWriter, IteratorWriter};
use ycm::YcmConfiguration;

// Re-export types for convenience.
pub use formats::{SerializationError, SerializationFormat};

/// The supported output file formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFormat {
    Ycm,
    ColorCoded,
    CompilationDatabase,
}

impl OutputFormat {
    /// The file name used when the output path is not given.
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Ycm => ".ycm_extra_conf.py",
            OutputFormat::ColorCoded => ".color_coded",
            OutputFormat::CompilationDatabase => "compile_commands.json",
        }
    }

    /// The scan variant the format is written from.
    pub fn variant(&self) -> Variant {
        match self {
            OutputFormat::Ycm | OutputFormat::ColorCoded => Variant::FlagSet,
            OutputFormat::CompilationDatabase => Variant::Database,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Ycm => write!(f, "YCM"),
            OutputFormat::ColorCoded => write!(f, "color_coded"),
            OutputFormat::CompilationDatabase => write!(f, "JSON compilation database"),
        }
    }
}

/// The content an output file is written from.
#[derive(Copy, Clone, Debug)]
pub enum Content<'a> {
    Flags(&'a [Flag]),
    Entries(&'a [Entry]),
}

/// Represents the writer of a single output file.
#[derive(Clone, Debug)]
pub struct OutputWriter {
    format: OutputFormat,
    path: path::PathBuf,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, path: impl Into<path::PathBuf>) -> Self {
        Self { format, path: path.into() }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn path(&self) -> &path::Path {
        &self.path
    }

    /// Writes the content into the file in the configured format.
    ///
    /// The content shall match the format's scan variant.
    pub fn write(self, content: Content<'_>) -> Result<(), WriterError> {
        match (self.format, content) {
            (OutputFormat::Ycm, Content::Flags(flags)) => {
                AtomicFileWriter::<YcmConfiguration>::create(&self.path)?.write(flags.iter())?;
                log::info!("Created {} config file with {} flags", self.format, flags.len());
            }
            (OutputFormat::ColorCoded, Content::Flags(flags)) => {
                AtomicFileWriter::<ColorCodedConfiguration>::create(&self.path)?.write(flags.iter())?;
                log::info!("Created {} config file with {} flags", self.format, flags.len());
            }
            (OutputFormat::CompilationDatabase, Content::Entries(entries)) => {
                AtomicFileWriter::<JsonCompilationDatabase>::create(&self.path)?.write(entries.iter().cloned())?;
                log::info!("Created compilation database with {} entries", entries.len());
            }
            (format, _) => return Err(WriterError::ContentMismatch(self.path, format)),
        }
        Ok(())
    }
}

/// Asks the user whether the existing file shall be overwritten.
///
/// The question is repeated until the answer is recognized. The end of the
/// input is taken as a refusal.
pub fn confirm_overwrite(
    path: &path::Path,
    mut input: impl BufRead,
    mut output: impl Write,
) -> io::Result<bool> {
    writeln!(output, "File already exists: {}", path.display())?;
    loop {
        write!(output, "Overwrite? [y/n] ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

/// Represents errors that can occur while creating an output writer.
#[derive(Error, Debug)]
pub enum WriterCreationError {
    #[error("Failed to create the output writer {0}: {1}")]
    Io(path::PathBuf, io::Error),
}

/// Represents errors that can occur while writing output.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error(transparent)]
    Creation(#[from] WriterCreationError),
    #[error("Serialization error {0}: {1}")]
    Io(path::PathBuf, SerializationError),
    #[error("Output {0} can't be written as {1}")]
    ContentMismatch(path::PathBuf, OutputFormat),
}
