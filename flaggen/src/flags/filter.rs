// SPDX-License-Identifier: GPL-3.0-or-later

//! Applies the inclusion policy to the tokens of a single line.
//!
//! The filter itself holds no state across lines. Macro definitions are
//! returned to the caller as such, and it's up to the aggregator to collect
//! and deduplicate them over the whole transcript.

use super::patterns;
use super::{Flag, Variant};
use std::path::{Path, PathBuf};

/// The outcome of the filter for one accepted token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accepted {
    Flag(Flag),
    Macro { name: String, value: String },
}

/// Selects and normalizes the compiler flags of a transcript line.
#[derive(Clone, Debug)]
pub struct Filter {
    prefix: PathBuf,
    variant: Variant,
}

impl Filter {
    /// Creates a filter which resolves relative paths against `prefix`.
    pub fn new(prefix: impl Into<PathBuf>, variant: Variant) -> Self {
        Self { prefix: prefix.into(), variant }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Returns the accepted flags of the line, in encounter order.
    pub fn apply(&self, tokens: &[String]) -> Vec<Accepted> {
        let mut result = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            if !self.is_candidate(token) {
                continue;
            }

            let definition = match self.variant {
                Variant::FlagSet => patterns::macro_definition(token),
                Variant::Database => None,
            };
            if let Some((name, value)) = definition {
                result.push(Accepted::Macro { name: name.to_string(), value: value.to_string() });
                continue;
            }

            let argument = tokens.get(index + 1).filter(|next| !next.starts_with('-'));
            match argument {
                Some(argument) if patterns::is_path_option(token) => {
                    if let Some(path) = self.resolve(argument) {
                        result.push(Accepted::Flag(Flag::with_path(token.as_str(), path)));
                    }
                }
                _ => {
                    if let Some(path) = token.strip_prefix("-I") {
                        if path.is_empty() {
                            log::debug!("Include option without path is ignored");
                            continue;
                        }
                        if let Some(path) = self.resolve(path) {
                            result.push(Accepted::Flag(Flag::bare(format!("-I{path}"))));
                        }
                    } else {
                        result.push(Accepted::Flag(Flag::bare(token.as_str())));
                    }
                }
            }
        }

        result
    }

    fn is_candidate(&self, token: &str) -> bool {
        if !token.starts_with('-') {
            return false;
        }
        match self.variant {
            Variant::FlagSet => patterns::is_whitelisted(token) || patterns::is_word_size(token),
            Variant::Database => patterns::is_whitelisted(token),
        }
    }

    /// Joins the path to the prefix, unless it points to a rejected location.
    fn resolve(&self, path: &str) -> Option<String> {
        let resolved = self.prefix.join(path).to_string_lossy().into_owned();
        if patterns::is_invalid_path(&resolved) {
            log::debug!("Path is rejected: {resolved}");
            None
        } else {
            Some(resolved)
        }
    }
}
