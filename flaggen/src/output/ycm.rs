// SPDX-License-Identifier: GPL-3.0-or-later

//! Writes the YouCompleteMe configuration file.
//!
//! The file is an embedded Python template, where the flags are inserted as
//! string literals of the `flags` list. Every other line of the template is
//! copied as it is.

use super::formats::{SerializationError, SerializationFormat};
use crate::flags::Flag;
use std::io::Write;

const TEMPLATE: &str = include_str!("../../templates/ycm_extra_conf.py");

/// The line of the template which is replaced by the flags.
const INSERTION_MARKER: &str = "    # INSERT FLAGS HERE";

/// The type represents the `.ycm_extra_conf.py` file format.
pub struct YcmConfiguration;

impl<'a> SerializationFormat<&'a Flag> for YcmConfiguration {
    fn write(writer: impl Write, flags: impl Iterator<Item = &'a Flag>) -> Result<(), SerializationError> {
        let mut writer = writer;
        writeln!(writer, "# Generated by {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
        writeln!(writer)?;

        let mut flags = Some(flags);
        for line in TEMPLATE.lines() {
            if line == INSERTION_MARKER {
                // The marker is expected once, a repeated marker is left empty.
                for flag in flags.take().into_iter().flatten() {
                    writeln!(writer, "{}", literal(flag))?;
                }
            } else {
                writeln!(writer, "{line}")?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}

/// Renders the flag as a Python list element.
fn literal(flag: &Flag) -> String {
    match flag {
        Flag::Bare(flag) => format!("    '{}',", escape(flag)),
        Flag::WithPath { option, path } => format!("    '{}', '{}',", escape(option), escape(path)),
    }
}

/// Escapes the characters which would end a single quoted Python string.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
