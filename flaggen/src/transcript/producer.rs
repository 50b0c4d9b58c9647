// SPDX-License-Identifier: GPL-3.0-or-later

//! Produces the build transcript by running the build tool.
//!
//! The build tool is not building the project for real. It runs in dry-run
//! mode, where it prints the commands it would execute. The standard output
//! of that run is the transcript.

use super::supervise::{BuildStep, SuperviseError, Supervisor};
use super::Transcript;
use crate::config;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use thiserror::Error;

/// The file which identifies the supported build system in the project root.
const BUILD_SYSTEM_MARKER: &str = "build/envsetup.sh";
/// The makefile of the build system, relative to the project root.
const BUILD_SYSTEM_MAKEFILE: &str = "build/core/main.mk";

/// A source of the build transcript.
pub trait TranscriptProducer {
    /// Runs the build and returns the captured transcript.
    ///
    /// Failure to run the build is fatal, while a build which runs but
    /// produces nothing useful is not detected here.
    fn produce(&self) -> Result<Transcript, ProducerError>;
}

/// Runs `make` in dry-run mode against the Android build system.
#[derive(Debug, Clone)]
pub struct MakeDryRun {
    program: PathBuf,
    flags: Vec<String>,
    clean: bool,
    root: PathBuf,
    module: String,
    verbose: bool,
}

impl MakeDryRun {
    /// Creates the producer for the project.
    ///
    /// Checks the project layout and resolves the build tool executable.
    pub fn create(
        build: &config::Build,
        root: &Path,
        module: &str,
        flags: Vec<String>,
        verbose: bool,
    ) -> Result<Self, ProducerError> {
        if !root.join(BUILD_SYSTEM_MARKER).is_file() {
            return Err(ProducerError::UnknownBuildSystem(root.to_path_buf()));
        }
        let program = which::which(&build.program)
            .map_err(|err| ProducerError::ProgramNotFound(build.program.clone(), err))?;
        log::debug!("Build tool found: {}", program.display());

        Ok(Self {
            program,
            flags,
            clean: build.clean,
            root: root.to_path_buf(),
            module: module.to_string(),
            verbose,
        })
    }

    fn clean_arguments(&self) -> Vec<OsString> {
        vec!["-C".into(), self.root.clone().into(), "clean".into()]
    }

    fn dry_run_arguments(&self) -> Vec<OsString> {
        let mut arguments: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        arguments.extend([
            "-n".into(),
            "-C".into(),
            self.root.clone().into(),
            "-f".into(),
            BUILD_SYSTEM_MAKEFILE.into(),
            "all_modules".into(),
            format!("BUILD_MODULES_IN_PATHS={}", self.module).into(),
        ]);
        arguments
    }

    /// The standard error of the build tool is only shown in verbose mode.
    fn diagnostics(&self) -> Stdio {
        if self.verbose { Stdio::inherit() } else { Stdio::null() }
    }

    fn command(&self, arguments: Vec<OsString>, output: Stdio) -> Command {
        let mut command = Command::new(&self.program);
        command.args(arguments).current_dir(&self.root).stdin(Stdio::null()).stdout(output).stderr(self.diagnostics());
        command
    }

    fn run(&self, supervisor: &Supervisor, step: BuildStep, mut command: Command) -> Result<(), ProducerError> {
        log::debug!("Executing the {step} step: {command:?}");
        let status = supervisor.run(step, &mut command)?;
        if !status.success() {
            log::warn!("Build tool {step} step exited with {status}");
        }
        Ok(())
    }
}

impl TranscriptProducer for MakeDryRun {
    fn produce(&self) -> Result<Transcript, ProducerError> {
        let started = Instant::now();
        let supervisor = Supervisor::new()?;

        if self.clean {
            log::info!("Preparing build directory...");
            let output = if self.verbose { Stdio::inherit() } else { Stdio::null() };
            self.run(&supervisor, BuildStep::Clean, self.command(self.clean_arguments(), output))?;
        }

        let transcript = tempfile::Builder::new()
            .prefix("flaggen-transcript-")
            .suffix(".log")
            .tempfile()
            .map_err(ProducerError::Transcript)?;
        let output = transcript.as_file().try_clone().map_err(ProducerError::Transcript)?;

        log::info!("Getting compile flags (this may take some time)...");
        self.run(&supervisor, BuildStep::DryRun, self.command(self.dry_run_arguments(), Stdio::from(output)))?;
        log::info!("Build completed in {:.2} sec", started.elapsed().as_secs_f64());

        Ok(Transcript::captured(transcript))
    }
}

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Unknown build system at {0}")]
    UnknownBuildSystem(PathBuf),
    #[error("Build tool '{0}' not found: {1}")]
    ProgramNotFound(String, which::Error),
    #[error("Failed to create the transcript file: {0}")]
    Transcript(std::io::Error),
    #[error(transparent)]
    Supervise(#[from] SuperviseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build(program: &str, clean: bool) -> config::Build {
        config::Build { program: program.to_string(), flags: None, clean }
    }

    fn android_tree() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("build/core")).unwrap();
        fs::write(root.path().join(BUILD_SYSTEM_MARKER), "").unwrap();
        root
    }

    #[test]
    fn test_unknown_build_system() {
        let root = tempfile::tempdir().unwrap();

        let result = MakeDryRun::create(&build("sh", false), root.path(), "bionic/libc", vec![], false);

        assert!(matches!(result, Err(ProducerError::UnknownBuildSystem(path)) if path == root.path()));
    }

    #[test]
    fn test_missing_build_tool() {
        let root = android_tree();

        let result =
            MakeDryRun::create(&build("flaggen-no-such-make", false), root.path(), "bionic/libc", vec![], false);

        assert!(matches!(result, Err(ProducerError::ProgramNotFound(name, _)) if name == "flaggen-no-such-make"));
    }

    #[cfg(unix)]
    #[test]
    fn test_arguments() {
        let root = android_tree();
        let producer = MakeDryRun::create(
            &build("sh", true),
            root.path(),
            "external/zlib",
            vec!["-i".into(), "-j4".into()],
            false,
        )
        .unwrap();

        let root_argument = OsString::from(root.path());
        assert_eq!(producer.clean_arguments(), vec![OsString::from("-C"), root_argument.clone(), "clean".into()]);
        assert_eq!(
            producer.dry_run_arguments(),
            vec![
                OsString::from("-i"),
                "-j4".into(),
                "-n".into(),
                "-C".into(),
                root_argument,
                "-f".into(),
                "build/core/main.mk".into(),
                "all_modules".into(),
                "BUILD_MODULES_IN_PATHS=external/zlib".into(),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_transcript_is_the_standard_output() {
        use crate::flags::FlagSetAggregator;
        use std::os::unix::fs::PermissionsExt;

        let root = android_tree();
        let script = root.path().join("fake-make");
        fs::write(
            &script,
            "#!/bin/sh\n\
             for arg in \"$@\"; do [ \"$arg\" = clean ] && exit 0; done\n\
             echo 'gcc -Wall -Iinc -c main.c'\n\
             echo 'this goes elsewhere' >&2\n\
             exit 1\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let program = script.to_string_lossy().into_owned();
        let producer = MakeDryRun::create(&build(&program, true), root.path(), "bionic/libc", vec![], false).unwrap();
        let mut transcript = producer.produce().unwrap();
        let result = transcript.scan(FlagSetAggregator::new("/root", vec![])).unwrap();

        assert_eq!(result.statistics.total(), 1);
        assert_eq!(result.flags.len(), 2);
    }
}
