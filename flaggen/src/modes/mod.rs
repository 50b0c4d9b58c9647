// SPDX-License-Identifier: GPL-3.0-or-later

mod execution;

use crate::context::Context;
use crate::flags::Flag;
use crate::output::OutputWriter;
use crate::transcript::{MakeDryRun, ProducerError, Transcript, TranscriptProducer};
use crate::{args, config};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub use execution::{EXIT_NO_ENTRIES, EXIT_UNKNOWN_BUILD_SYSTEM, Generator, RuntimeError};

/// Represent the modes the application can run in.
///
/// - build: run the build tool in dry-run mode and scan its output.
/// - replay: scan a previously captured build log.
///
/// The output generation is the same in both modes.
pub enum Mode {
    Build(MakeDryRun, Generator),
    Replay(PathBuf, Generator),
}

impl Mode {
    /// Configure the application mode based on the command line arguments and the configuration.
    ///
    /// Here we are checking if the command line arguments and configuration are valid.
    /// If the arguments are valid, we create the appropriate mode instance.
    /// If that is not the case, we try to return a useful error message.
    pub fn configure(
        context: &Context,
        args: args::Arguments,
        config: config::Main,
    ) -> Result<Self, ConfigurationError> {
        let root = absolute(context, &args.project);
        if !root.is_dir() {
            return Err(ConfigurationError::ProjectNotFound(root));
        }
        let prefix = args.include_prefix.clone().unwrap_or_else(|| root.clone());
        let directory = absolute(context, &prefix);

        let outputs = args
            .formats
            .iter()
            .map(|format| {
                let path = match &args.output {
                    Some(path) => absolute(context, path),
                    None => root.join(&args.module).join(format.file_name()),
                };
                OutputWriter::new(*format, path)
            })
            .collect();
        let language = config.language.flags.iter().map(Flag::bare).collect();
        let verbose = args.verbose > 0;
        let generator = Generator::new(prefix, directory, language, outputs, args.force, verbose);

        match &args.transcript {
            Some(path) => {
                log::debug!("Mode: replay the build log");
                Ok(Self::Replay(absolute(context, path), generator))
            }
            None => {
                log::debug!("Mode: run the build and scan its output");
                let flags = args.make_flags.clone().unwrap_or_else(|| config.build.flags());
                let producer = MakeDryRun::create(&config.build, &root, &args.module, flags, verbose)?;
                Ok(Self::Build(producer, generator))
            }
        }
    }

    /// It actually runs the application mode.
    ///
    /// This is when the build command is executed or the build log is read,
    /// and the output files are written. These errors are all run-time errors,
    /// the user were passing valid arguments and configurations.
    pub fn run(self) -> ExitCode {
        let status = match self {
            Self::Build(producer, generator) => producer
                .produce()
                .map_err(RuntimeError::from)
                .and_then(|transcript| Self::generate(transcript, generator)),
            Self::Replay(path, generator) => Transcript::open(&path)
                .map_err(RuntimeError::from)
                .and_then(|transcript| Self::generate(transcript, generator)),
        };
        match status {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                log::error!("flaggen: {error}");
                error.exit_code()
            }
        }
    }

    fn generate(transcript: Transcript, generator: Generator) -> Result<(), RuntimeError> {
        let stdin = io::stdin();
        generator.run(transcript, stdin.lock(), io::stdout())
    }
}

/// Makes the path absolute against the working directory of the invocation.
fn absolute(context: &Context, path: &Path) -> PathBuf {
    context.current_directory.join(path).components().collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Project directory does not exist: {0}")]
    ProjectNotFound(PathBuf),
    #[error(transparent)]
    Producer(#[from] ProducerError),
}

impl ConfigurationError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ConfigurationError::Producer(ProducerError::UnknownBuildSystem(_)) => {
                ExitCode::from(EXIT_UNKNOWN_BUILD_SYSTEM)
            }
            _ => ExitCode::FAILURE,
        }
    }
}
