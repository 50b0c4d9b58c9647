// SPDX-License-Identifier: GPL-3.0-or-later

use crate::flags::{Database, DatabaseAggregator, Flag, FlagSet, FlagSetAggregator, ScanStatistics, Variant};
use crate::output::{self, Content, OutputWriter, WriterError};
use crate::transcript::{ProducerError, ScanError, Transcript};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Exit code when the build system of the project is not supported.
pub const EXIT_UNKNOWN_BUILD_SYSTEM: u8 = 2;
/// Exit code when the transcript had no relevant entries.
pub const EXIT_NO_ENTRIES: u8 = 3;

/// Turns a transcript into the requested output files.
///
/// The transcript is scanned once per needed granularity: the flag set is
/// shared by the YCM and color_coded outputs, while the compilation database
/// scan runs only when that output is requested.
pub struct Generator {
    /// Joined to the relative paths of the flag set, as given.
    prefix: PathBuf,
    /// The absolute form of the prefix, the directory of the database entries.
    directory: PathBuf,
    language: Vec<Flag>,
    outputs: Vec<OutputWriter>,
    force: bool,
    verbose: bool,
}

impl Generator {
    pub fn new(
        prefix: PathBuf,
        directory: PathBuf,
        language: Vec<Flag>,
        outputs: Vec<OutputWriter>,
        force: bool,
        verbose: bool,
    ) -> Self {
        Self { prefix, directory, language, outputs, force, verbose }
    }

    fn requires(&self, variant: Variant) -> bool {
        self.outputs.iter().any(|output| output.format().variant() == variant)
    }

    /// Scans the transcript and writes the output files.
    ///
    /// The user is asked before an existing file is overwritten, unless the
    /// writing was forced. The answers are read from `input`.
    pub fn run(self, mut transcript: Transcript, input: impl BufRead, prompt: impl Write) -> Result<(), RuntimeError> {
        log::info!("Processing compile flags...");

        let flag_set: Option<FlagSet> = if self.requires(Variant::FlagSet) {
            let result = transcript.scan(FlagSetAggregator::new(&self.prefix, self.language.clone()))?;
            log::debug!("{}", result.statistics);
            Some(result)
        } else {
            None
        };
        let database: Option<Database> = if self.requires(Variant::Database) {
            let result = transcript.scan(DatabaseAggregator::new(&self.directory))?;
            log::debug!("{}", result.statistics);
            Some(result)
        } else {
            None
        };

        let statistics: Vec<ScanStatistics> = flag_set
            .iter()
            .map(|result| result.statistics)
            .chain(database.iter().map(|result| result.statistics))
            .collect();
        for statistics in &statistics {
            log::info!(
                "Collected {} relevant entries for compilation ({} discarded).",
                statistics.qualifying,
                statistics.skipped
            );
        }
        if statistics.iter().any(|statistics| statistics.qualifying == 0) {
            return Err(self.no_entries(transcript));
        }

        let mut input = input;
        let mut prompt = prompt;
        for writer in self.outputs {
            log::info!("Generating file '{}'", writer.path().display());
            if writer.path().exists()
                && !self.force
                && !output::confirm_overwrite(writer.path(), &mut input, &mut prompt).map_err(RuntimeError::Prompt)?
            {
                return Err(RuntimeError::Declined(writer.path().to_path_buf()));
            }

            let content = match (writer.format().variant(), &flag_set, &database) {
                (Variant::FlagSet, Some(flag_set), _) => Content::Flags(&flag_set.flags),
                (Variant::Database, _, Some(database)) => Content::Entries(&database.entries),
                // Every needed scan was done above.
                _ => continue,
            };
            writer.write(content)?;
        }

        Ok(())
    }

    /// Reports the empty scan, and keeps the transcript for inspection.
    fn no_entries(&self, transcript: Transcript) -> RuntimeError {
        let transcript = match transcript.keep() {
            Ok(path) => Some(path),
            Err(error) => {
                log::warn!("{error}");
                None
            }
        };
        if !self.verbose {
            log::info!(
                "Try running with the --verbose flag to see build system output - \
                 the most common cause of this is a hardcoded compiler path."
            );
        }
        RuntimeError::NoEntries { transcript }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Producer(#[from] ProducerError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error("Failed to read the answer: {0}")]
    Prompt(std::io::Error),
    #[error("Output file {0} is not overwritten")]
    Declined(PathBuf),
    #[error(
        "No commands were logged to the build logs (transcript: {}). Your build system may not be compatible.",
        .transcript.as_ref().map(|path| path.display().to_string()).unwrap_or_else(|| String::from("removed"))
    )]
    NoEntries { transcript: Option<PathBuf> },
}

impl RuntimeError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RuntimeError::Producer(ProducerError::UnknownBuildSystem(_)) => ExitCode::from(EXIT_UNKNOWN_BUILD_SYSTEM),
            RuntimeError::NoEntries { .. } => ExitCode::from(EXIT_NO_ENTRIES),
            _ => ExitCode::FAILURE,
        }
    }
}
