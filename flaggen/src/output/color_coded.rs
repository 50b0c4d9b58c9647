// SPDX-License-Identifier: GPL-3.0-or-later

//! Writes the `.color_coded` flag listing.
//!
//! The format is one argument per line. Options with a separate path argument
//! are written on two consecutive lines.

use super::formats::{SerializationError, SerializationFormat};
use crate::flags::Flag;
use std::io::Write;

pub struct ColorCodedConfiguration;

impl<'a> SerializationFormat<&'a Flag> for ColorCodedConfiguration {
    fn write(writer: impl Write, flags: impl Iterator<Item = &'a Flag>) -> Result<(), SerializationError> {
        let mut writer = writer;
        for flag in flags {
            for argument in flag.as_arguments() {
                writeln!(writer, "{argument}")?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}
