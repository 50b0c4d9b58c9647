// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `flaggen.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The local configuration directory of the user
//! 3. The configuration directory of the user
//! 4. The local configuration directory of the application
//! 5. The configuration directory of the application
//!
//! ```yaml
//! schema: "1.0"
//!
//! build:
//!   program: make
//!   flags: ["-i", "-j8"]
//!   clean: true
//!
//! language:
//!   flags: ["-x", "c++", "-std=c++11"]
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use serde::Deserialize;
    use std::fmt;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, Deserialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default)]
        pub build: Build,
        #[serde(default)]
        pub language: Language,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                build: Build::default(),
                language: Language::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            writeln!(f, "schema: {}", self.schema)?;
            writeln!(f, "build:")?;
            writeln!(f, "  program: {}", self.build.program)?;
            match &self.build.flags {
                Some(flags) => writeln!(f, "  flags: {flags:?}")?,
                None => writeln!(f, "  flags: {:?} (default)", default_make_flags())?,
            }
            writeln!(f, "  clean: {}", self.build.clean)?;
            writeln!(f, "language:")?;
            write!(f, "  flags: {:?}", self.language.flags)
        }
    }

    /// The build tool invocation which produces the transcript.
    #[derive(Debug, PartialEq, Deserialize)]
    pub struct Build {
        #[serde(default = "default_program")]
        pub program: String,
        #[serde(default)]
        pub flags: Option<Vec<String>>,
        #[serde(default = "default_clean")]
        pub clean: bool,
    }

    impl Build {
        /// The build tool flags, or the default flags when not configured.
        pub fn flags(&self) -> Vec<String> {
            self.flags.clone().unwrap_or_else(default_make_flags)
        }
    }

    impl Default for Build {
        fn default() -> Self {
            Self { program: default_program(), flags: None, clean: default_clean() }
        }
    }

    /// The language mode flags, which are put in front of the flag set.
    #[derive(Debug, PartialEq, Deserialize)]
    pub struct Language {
        #[serde(default = "default_language_flags")]
        pub flags: Vec<String>,
    }

    impl Default for Language {
        fn default() -> Self {
            Self { flags: default_language_flags() }
        }
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    fn default_program() -> String {
        String::from("make")
    }

    fn default_clean() -> bool {
        true
    }

    /// Ignore errors, and use all processors.
    pub(super) fn default_make_flags() -> Vec<String> {
        let jobs = std::thread::available_parallelism().map(|count| count.get()).unwrap_or(1);
        vec![String::from("-i"), format!("-j{jobs}")]
    }

    fn default_language_flags() -> Vec<String> {
        vec![String::from("-x"), String::from("c++"), String::from("-std=c++11")]
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: String },
        #[error("Empty list for field '{field}'")]
        EmptyList { field: &'static str },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Turns the problems found into the validation result.
    fn report(mut errors: Vec<ValidationError>) -> Result<(), ValidationError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple { errors }),
        }
    }

    fn empty_strings<'a>(field: &'a str, values: &'a [String]) -> impl Iterator<Item = ValidationError> + 'a {
        values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.trim().is_empty())
            .map(move |(idx, _)| ValidationError::EmptyString { field: format!("{field}[{idx}]") })
    }

    impl Build {
        fn problems(&self) -> Vec<ValidationError> {
            let mut errors = Vec::new();
            if self.program.trim().is_empty() {
                errors.push(ValidationError::EmptyString { field: String::from("build.program") });
            }
            if let Some(flags) = &self.flags {
                errors.extend(empty_strings("build.flags", flags));
            }
            errors
        }
    }

    impl Language {
        fn problems(&self) -> Vec<ValidationError> {
            let mut errors = Vec::new();
            if self.flags.is_empty() {
                errors.push(ValidationError::EmptyList { field: "language.flags" });
            }
            errors.extend(empty_strings("language.flags", &self.flags));
            errors
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut errors = config.build.problems();
            errors.extend(config.language.problems());
            report(errors)
        }
    }

    impl Validator<Build> for Build {
        type Error = ValidationError;

        fn validate(config: &Build) -> Result<(), Self::Error> {
            report(config.problems())
        }
    }

    impl Validator<Language> for Language {
        type Error = ValidationError;

        fn validate(config: &Language) -> Result<(), Self::Error> {
            report(config.problems())
        }
    }

}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    const CONFIG_FILE_NAME: &str = "flaggen.yml";

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the specified file or the default locations.
        ///
        /// If the configuration file is specified, it will be used. Otherwise, the default locations
        /// will be searched for the configuration file. If the configuration file is not found, the
        /// default configuration will be returned.
        pub fn load(context: &crate::context::Context, filename: &Option<PathBuf>) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                Self::from_file(path)
            } else {
                for location in Self::file_locations(context) {
                    debug!("Checking configuration file: {}", location.display());
                    if location.exists() {
                        return Self::from_file(location.as_path());
                    }
                }
                debug!("Configuration file not found. Using the default configuration.");
                Ok(Main::default())
            }
        }

        /// The default locations where the configuration file can be found.
        fn file_locations(context: &crate::context::Context) -> Vec<PathBuf> {
            let mut locations = Vec::new();

            locations.push(context.current_directory.clone());
            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }
            if let Some(proj_dirs) = ProjectDirs::from("org", "flaggen", "flaggen") {
                locations.push(proj_dirs.config_local_dir().to_path_buf());
                locations.push(proj_dirs.config_dir().to_path_buf());
            }
            // filter out duplicate elements from the list
            locations.dedup();
            locations.iter().map(|p| p.join(CONFIG_FILE_NAME)).collect()
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Loading configuration file: {}", path.display());

            let content = fs::read_to_string(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let config: Main = Self::from_str(&content)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            Main::validate(&config)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(config)
        }

        /// Define the deserialization format of the config file.
        fn from_str<T>(content: &str) -> Result<T, serde_saphyr::Error>
        where
            T: serde::de::DeserializeOwned,
        {
            serde_saphyr::from_str(content)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_saphyr::Error,
        },
        /// Error when configuration validation fails.
        #[error("Configuration validation failed in '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

}
