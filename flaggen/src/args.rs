// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The module is defining types to represent a structured form of the
//! program invocation. The `Arguments` type is used to represent all
//! possible invocations of the program.

use crate::output::OutputFormat;
use anyhow::anyhow;
use clap::{ArgAction, ArgMatches, Command, arg, command, value_parser};
use std::fmt;
use std::path::PathBuf;

const DEFAULT_MODULE: &str = "bionic/libc";
const DEFAULT_FORMAT: &str = "ycm";
const FORMAT_ALL: &str = "all";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    /// The path of the configuration file.
    pub config: Option<PathBuf>,
    /// The verbosity level, the count of `-v` flags.
    pub verbose: u8,
    /// Overwrite the output files without asking.
    pub force: bool,
    /// The output formats to generate.
    pub formats: Vec<OutputFormat>,
    /// Flags to pass to the build tool, overriding the configured ones.
    pub make_flags: Option<Vec<String>>,
    /// Output file path, only when a single format is requested.
    pub output: Option<PathBuf>,
    /// The module to generate the flags for, relative to the project root.
    pub module: String,
    /// Prefix path for relative paths in the flags.
    pub include_prefix: Option<PathBuf>,
    /// Use an existing build log instead of running the build.
    pub transcript: Option<PathBuf>,
    /// The root directory of the project.
    pub project: PathBuf,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let config = matches.get_one::<PathBuf>("config").cloned();
        let verbose = matches.get_count("verbose");
        let force = matches.get_flag("force");

        let format = matches.get_one::<String>("format").map(String::as_str).unwrap_or(DEFAULT_FORMAT);
        let formats = match format {
            "ycm" => vec![OutputFormat::Ycm],
            "cc" => vec![OutputFormat::ColorCoded],
            "json" => vec![OutputFormat::CompilationDatabase],
            FORMAT_ALL => vec![OutputFormat::Ycm, OutputFormat::ColorCoded, OutputFormat::CompilationDatabase],
            other => return Err(anyhow!("unrecognized output format: {other}")),
        };

        let make_flags = matches
            .get_one::<String>("make-flags")
            .map(|flags| shell_words::split(flags).map_err(|err| anyhow!("invalid build tool flags '{flags}': {err}")))
            .transpose()?;

        let output = matches.get_one::<PathBuf>("output").cloned();
        if output.is_some() && formats.len() > 1 {
            return Err(anyhow!("the output file can't be set when multiple formats are requested"));
        }

        let module = matches.get_one::<String>("module").cloned().unwrap_or_else(|| DEFAULT_MODULE.to_string());
        let include_prefix = matches.get_one::<PathBuf>("include-prefix").cloned();
        let transcript = matches.get_one::<PathBuf>("transcript").cloned();
        let project =
            matches.get_one::<PathBuf>("PROJECT_DIR").cloned().ok_or_else(|| anyhow!("missing project directory"))?;

        Ok(Arguments {
            config,
            verbose,
            force,
            formats,
            make_flags,
            output,
            module,
            include_prefix,
            transcript,
            project,
        })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments:")?;
        writeln!(f, "  project: {}", self.project.display())?;
        writeln!(f, "  module: {}", self.module)?;
        let formats: Vec<String> = self.formats.iter().map(ToString::to_string).collect();
        writeln!(f, "  formats: {}", formats.join(", "))?;
        if let Some(output) = &self.output {
            writeln!(f, "  output: {}", output.display())?;
        }
        if let Some(prefix) = &self.include_prefix {
            writeln!(f, "  include prefix: {}", prefix.display())?;
        }
        if let Some(flags) = &self.make_flags {
            writeln!(f, "  build tool flags: {flags:?}")?;
        }
        if let Some(transcript) = &self.transcript {
            writeln!(f, "  transcript: {}", transcript.display())?;
        }
        if let Some(config) = &self.config {
            writeln!(f, "  config: {}", config.display())?;
        }
        write!(f, "  force: {}, verbose: {}", self.force, self.verbose)
    }
}

/// Represents the command line interface of the application.
pub fn cli() -> Command {
    command!()
        .about("Generates YouCompleteMe, color_coded and compilation database files from a build")
        .arg_required_else_help(true)
        .args(&[
            arg!(-v --verbose ... "Show the output of the build process, repeat for more").action(ArgAction::Count),
            arg!(-f --force "Overwrite the output files if they exist").action(ArgAction::SetTrue),
            arg!(-F --format <FORMAT> "Format of the output file")
                .value_parser(["ycm", "cc", "json", FORMAT_ALL])
                .default_value(DEFAULT_FORMAT),
            arg!(-M --"make-flags" <FLAGS> "Flags to pass to the build tool (default: \"-i -j<cpus>\")")
                .allow_hyphen_values(true),
            arg!(-o --output <FILE> "Save the output as FILE (only with a single format)")
                .value_parser(value_parser!(PathBuf)),
            arg!(-m --module <MODULE> "The module to generate the flags for").default_value(DEFAULT_MODULE),
            arg!(-p --"include-prefix" <PREFIX> "Prefix of relative include paths (default: the project root)")
                .value_parser(value_parser!(PathBuf)),
            arg!(-c --config <FILE> "Path of the config file").value_parser(value_parser!(PathBuf)),
            arg!(--transcript <FILE> "Use a captured build log instead of running the build")
                .value_parser(value_parser!(PathBuf)),
            arg!(<PROJECT_DIR> "The root directory of the project").value_parser(value_parser!(PathBuf)),
        ])
}
